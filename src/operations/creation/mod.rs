mod edgeloop_fill;
mod make_face;
mod make_grid;
mod make_wire;

pub use edgeloop_fill::EdgeloopFill;
pub use make_face::MakeFace;
pub use make_grid::{Grid, MakeGrid};
pub use make_wire::{MakeWire, Wire};
