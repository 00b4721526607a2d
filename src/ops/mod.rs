pub mod board_ops;
pub mod card_ops;
pub mod check;
pub mod lane_ops;
pub mod sort;
