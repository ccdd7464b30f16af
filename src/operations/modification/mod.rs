mod delete;
mod recalc_normals;

pub use delete::{Delete, DeleteContext};
pub use recalc_normals::RecalcFaceNormals;
