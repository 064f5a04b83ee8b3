pub use vibb_core::model::PeerId;

pub mod model {
    pub use vibb_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use vibb_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use vibb_client::*;
}
