pub mod viewer;

pub use viewer::{USER_ID_HEADER, USER_ROLE_HEADER, Viewer, viewer_middleware};
