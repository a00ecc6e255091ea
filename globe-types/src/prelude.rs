pub use crate::body::ReferenceBody;
pub use crate::layout::{CanvasSize, Margins, Rect, ViewportMetrics};
pub use crate::orbit::{EciPosition, Geodetic};
pub use crate::time::UtcTimestamp;
pub use crate::tle::UnstructuredTle;
