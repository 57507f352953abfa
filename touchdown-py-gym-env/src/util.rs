//! Conversion between Python objects and touchdown types.
use anyhow::{anyhow, Result};
use ndarray::{Array3, ArrayD};
use numpy::{PyArray1, PyArray3, PyArrayDyn};
use pyo3::{IntoPy, PyAny, PyObject, Python};
use std::convert::TryFrom;
use touchdown_core::{Frame, LanderObs};

/// Convert an observation array (`float32` or `float64`) into [`LanderObs`].
pub fn pyobj_to_obs(obj: &PyAny) -> Result<LanderObs> {
    let v: Vec<f32> = if let Ok(arr) = obj.extract::<&PyArrayDyn<f32>>() {
        let arr: ArrayD<f32> = arr.to_owned_array();
        arr.iter().copied().collect()
    } else {
        let arr: &PyArrayDyn<f64> = obj.extract()?;
        let arr: ArrayD<f64> = arr.to_owned_array();
        arr.iter().map(|&x| x as f32).collect()
    };
    Ok(LanderObs::try_from(v.as_slice())?)
}

/// Convert [`LanderObs`] into a `float32` array of shape `(8,)`.
pub fn obs_to_pyobj(py: Python, obs: &LanderObs) -> PyObject {
    PyArray1::from_vec(py, obs.to_array().to_vec()).into_py(py)
}

/// Convert an `(H, W, 3)` `uint8` array into a [`Frame`].
pub fn pyobj_to_frame(obj: &PyAny) -> Result<Frame> {
    let arr: &PyArray3<u8> = obj.extract()?;
    let (h, w, c) = match arr.shape() {
        &[h, w, c] => (h, w, c),
        s => return Err(anyhow!("Unexpected frame shape {:?}", s)),
    };
    if c != 3 {
        return Err(anyhow!("Expected 3 channels, got {}", c));
    }
    let arr: Array3<u8> = arr.to_owned_array();
    let data: Vec<u8> = arr.iter().copied().collect();
    Frame::from_raw(w as u32, h as u32, data)
        .ok_or_else(|| anyhow!("Frame buffer does not match {}x{}", w, h))
}
