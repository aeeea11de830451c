pub mod hit;
pub mod paint;
pub mod view;

pub use hit::{hit_test, hit_test_screen};
pub use paint::{DisplayList, NodeShape, Primitive, Theme, display_list};
pub use view::{ViewTransform, label_anchor};
