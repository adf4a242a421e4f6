pub mod gate_check;
pub mod mock_gate;
pub mod refine_next;
pub mod transport_check;
