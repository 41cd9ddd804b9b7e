use std::sync::{Arc, Mutex};
use tch::{CModule, Device, Kind, Tensor};

use super::features::FeatureVector;
use super::model::{Classifier, InferenceError};
use super::preprocess::ImageTensor;

/// TorchScript export of the image + patient-feature classifier.
///
/// A single module is shared by all workers and calls are serialized on the
/// mutex, since `forward` on one module is not safe to run concurrently.
#[derive(Clone)]
pub struct TorchModel {
    model: Arc<Mutex<CModule>>,
    device: Device,
    apply_softmax: bool,
}

impl TorchModel {
    pub fn load(model_path: &str, apply_softmax: bool) -> Result<Self, tch::TchError> {
        let device = Device::cuda_if_available();
        let mut module = CModule::load_on_device(model_path, device)?;
        module.set_eval();
        Ok(Self {
            model: Arc::new(Mutex::new(module)),
            device,
            apply_softmax,
        })
    }
}

fn to_tensor<'a>(values: impl Iterator<Item = &'a f32>, shape: &[usize], device: Device) -> Tensor {
    let values: Vec<f32> = values.copied().collect();
    let dims: Vec<i64> = shape.iter().map(|&d| d as i64).collect();
    Tensor::from_slice(&values)
        .reshape(dims.as_slice())
        .to_device(device)
}

/// Flattens the `(1, classes)` model output, turning logits into
/// probabilities when the export does not end in a softmax.
fn scores_from_output(output: &Tensor, apply_softmax: bool) -> Vec<f32> {
    let output = if apply_softmax {
        output.softmax(-1, Kind::Float)
    } else {
        output.to_kind(Kind::Float)
    };
    let output_flat = output.to_device(Device::Cpu).contiguous().view([-1]);
    let num_elements = output_flat.size()[0] as usize;
    let mut output_vec = vec![0.0f32; num_elements];
    output_flat.copy_data(&mut output_vec, num_elements);
    output_vec
}

fn backend(err: tch::TchError) -> InferenceError {
    InferenceError::Backend(Box::new(err))
}

impl Classifier for TorchModel {
    fn infer(
        &self,
        image: &ImageTensor,
        features: &FeatureVector,
    ) -> Result<Vec<f32>, InferenceError> {
        let image = to_tensor(image.as_array().iter(), image.shape(), self.device);
        let features = to_tensor(features.as_array().iter(), features.shape(), self.device);

        let model = self.model.lock().map_err(|_| InferenceError::LockPoisoned)?;
        let output = tch::no_grad(|| model.forward_ts(&[image, features])).map_err(backend)?;
        Ok(scores_from_output(&output, self.apply_softmax))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn image_tensor_keeps_nhwc_layout() {
        let mut array = Array4::zeros((1, 28, 28, 3));
        array[[0, 2, 5, 1]] = 0.5;
        let image = ImageTensor::from_array(array);

        let tensor = to_tensor(image.as_array().iter(), image.shape(), Device::Cpu);

        assert_eq!(tensor.size(), vec![1, 28, 28, 3]);
        assert_eq!(tensor.double_value(&[0, 2, 5, 1]), 0.5);
        assert_eq!(tensor.double_value(&[0, 5, 2, 1]), 0.0);
    }

    #[test]
    fn feature_row_is_one_by_four() {
        let features = FeatureVector::new(0.25, 1, 3);

        let tensor = to_tensor(features.as_array().iter(), features.shape(), Device::Cpu);

        assert_eq!(tensor.size(), vec![1, 4]);
        assert_eq!(tensor.double_value(&[0, 0]), 0.25);
        assert_eq!(tensor.double_value(&[0, 2]), 3.0);
        assert_eq!(tensor.double_value(&[0, 3]), 0.0);
    }

    #[test]
    fn logits_become_a_distribution() {
        let output = Tensor::from_slice(&[1.0f32, 2.0, 6.0, -3.0, 0.0, 0.5, 4.0]).reshape([1, 7]);

        let scores = scores_from_output(&output, true);

        assert_eq!(scores.len(), 7);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
        assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        let top = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(top, Some(2));
    }

    #[test]
    fn probabilities_pass_through_without_softmax() {
        let probs = [0.05f32, 0.05, 0.05, 0.05, 0.05, 0.05, 0.70];
        let output = Tensor::from_slice(&probs).reshape([1, 7]);

        assert_eq!(scores_from_output(&output, false), probs.to_vec());
    }
}
