//! Shared fixtures for integration tests
//!
//! Builds tiny ONNX graphs directly in protobuf wire format so the tests do
//! not depend on any downloaded model.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

const WIRE_VARINT: u64 = 0;
const WIRE_LEN: u64 = 2;

const ONNX_FLOAT: i64 = 1;
const ATTR_INT: i64 = 2;
const ATTR_INTS: i64 = 7;

fn varint(mut v: u64, out: &mut Vec<u8>) {
    while v >= 0x80 {
        out.push((v as u8) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

fn int_field(field: u64, v: i64, out: &mut Vec<u8>) {
    varint((field << 3) | WIRE_VARINT, out);
    varint(v as u64, out);
}

fn bytes_field(field: u64, data: &[u8], out: &mut Vec<u8>) {
    varint((field << 3) | WIRE_LEN, out);
    varint(data.len() as u64, out);
    out.extend_from_slice(data);
}

fn float_value_info(name: &str) -> Vec<u8> {
    let mut tensor_type = Vec::new();
    int_field(1, ONNX_FLOAT, &mut tensor_type);

    let mut type_proto = Vec::new();
    bytes_field(1, &tensor_type, &mut type_proto);

    let mut value_info = Vec::new();
    bytes_field(1, name.as_bytes(), &mut value_info);
    bytes_field(2, &type_proto, &mut value_info);
    value_info
}

/// ONNX graph averaging each channel of an NHWC input: `[N, H, W, C] -> [N, C]`
pub fn channel_mean_graph() -> Vec<u8> {
    let mut axes = Vec::new();
    bytes_field(1, b"axes", &mut axes);
    int_field(8, 1, &mut axes);
    int_field(8, 2, &mut axes);
    int_field(20, ATTR_INTS, &mut axes);

    let mut keepdims = Vec::new();
    bytes_field(1, b"keepdims", &mut keepdims);
    int_field(3, 0, &mut keepdims);
    int_field(20, ATTR_INT, &mut keepdims);

    let mut node = Vec::new();
    bytes_field(1, b"input", &mut node);
    bytes_field(2, b"scores", &mut node);
    bytes_field(3, b"channel_mean", &mut node);
    bytes_field(4, b"ReduceMean", &mut node);
    bytes_field(5, &axes, &mut node);
    bytes_field(5, &keepdims, &mut node);

    let mut graph = Vec::new();
    bytes_field(1, &node, &mut graph);
    bytes_field(2, b"channel_mean", &mut graph);
    bytes_field(11, &float_value_info("input"), &mut graph);
    bytes_field(12, &float_value_info("scores"), &mut graph);

    let mut opset = Vec::new();
    int_field(2, 13, &mut opset);

    let mut model = Vec::new();
    int_field(1, 7, &mut model);
    bytes_field(7, &graph, &mut model);
    bytes_field(8, &opset, &mut model);
    model
}

pub fn write_channel_mean_graph(dir: &Path) -> PathBuf {
    let path = dir.join("channel_mean.onnx");
    std::fs::write(&path, channel_mean_graph()).unwrap();
    path
}

/// Label table for the channel-mean graph after caffe preprocessing (BGR)
pub fn write_bgr_labels(dir: &Path) -> PathBuf {
    write_labels(
        dir,
        &[("n_blue", "blue"), ("n_green", "green"), ("n_red", "red")],
    )
}

pub fn write_labels(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let table: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .enumerate()
        .map(|(i, (id, label))| (i.to_string(), serde_json::json!([id, label])))
        .collect();
    let path = dir.join("labels.json");
    std::fs::write(&path, serde_json::to_string(&table).unwrap()).unwrap();
    path
}

pub fn solid_png(w: u32, h: u32, px: [u8; 3]) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(px)))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}
