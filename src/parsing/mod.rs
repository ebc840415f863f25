pub mod transform;
pub mod values;
pub mod xml;

pub use transform::{child_transform, parse_transform};
pub use values::{parse_bool, parse_float, parse_int, parse_matrix, parse_rgb, parse_vec3, to_row_major};
pub use xml::{Element, parse_document, substitute_defaults};
