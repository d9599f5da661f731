pub mod io;
pub mod ops;

pub use self::io::{encode_png, load_rgba_image, save_json};
pub use self::ops::{composite_quad, fit_to_tile, placeholder_tile, snap_monochrome};
