mod mock_media;

pub use mock_frames::*;
pub use mock_media::*;
pub use recording::*;
