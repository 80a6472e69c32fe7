//! AWS (Amazon Web Services) modules.
//!
//! ## Available Modules
//!
//! - [`ElasticTranscoderPipelineModule`](elastic_transcoder::ElasticTranscoderPipelineModule): pipeline lifecycle
//! - [`ElasticTranscoderPresetModule`](elastic_transcoder::ElasticTranscoderPresetModule): preset lifecycle
//!
//! ## Authentication
//!
//! AWS credentials are loaded from the standard AWS credential chain:
//!
//! 1. Environment variables (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`)
//! 2. AWS credentials file (`~/.aws/credentials`)
//! 3. IAM instance profile (when running on EC2)
//! 4. ECS task role (when running in ECS)
//!
//! The region can be specified via:
//! - Module parameter (`region`)
//! - `--region` or the `region` config key
//! - Environment variable (`AWS_REGION` or `AWS_DEFAULT_REGION`)
//! - AWS config file (`~/.aws/config`)

pub mod elastic_transcoder;

pub use elastic_transcoder::{ElasticTranscoderPipelineModule, ElasticTranscoderPresetModule};
