pub mod model_locator;
pub mod onnx_accent_model;
pub mod working_dir;
