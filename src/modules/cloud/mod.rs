//! Cloud provider modules.
//!
//! ## Feature Flags
//!
//! - `aws`: Enable the AWS SDK backed modules (Elastic Transcoder)
//!
//! ## Example
//!
//! ```yaml
//! - name: Media pipeline
//!   aws_elastictranscoder_pipeline:
//!     name: media
//!     input_bucket: uploads
//!     output_bucket: transcoded
//!     role: arn:aws:iam::123456789012:role/transcoder
//!     region: us-east-1
//! ```

#[cfg(feature = "aws")]
pub mod aws;

#[cfg(feature = "aws")]
pub use aws::{ElasticTranscoderPipelineModule, ElasticTranscoderPresetModule};
