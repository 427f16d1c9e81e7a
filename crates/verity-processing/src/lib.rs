//! Image admission, tensor encoding and classification.
//!
//! The stages run in order for every upload:
//! - [`UploadValidator`] checks filename extension, content type and size
//! - [`ImageCodec`] decodes the bytes into a normalized NHWC tensor
//! - a [`Classifier`] scores the tensor and [`select_label`] picks the winner
//!
//! Each stage's error converts into [`verity_core::PipelineError`].

pub mod classifier;
pub mod codec;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod validator;

pub use classifier::{select_label, Classifier, ClassifierError, ScoredLabel, UnavailableClassifier};
pub use codec::{CodecError, ImageCodec, ImageTensor};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
pub use validator::{UploadValidator, ValidationError};
