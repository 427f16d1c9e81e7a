//! Test fixtures: encoded images and multipart forms.

use axum_test::multipart::{MultipartForm, Part};
use std::io::Cursor;

/// Encoded solid-color image of the given size.
pub fn create_test_image(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([0, 120, 60]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("encode test image");
    buf.into_inner()
}

pub fn create_test_png() -> Vec<u8> {
    create_test_image(48, 24, image::ImageFormat::Png)
}

pub fn create_test_jpeg() -> Vec<u8> {
    create_test_image(40, 40, image::ImageFormat::Jpeg)
}

pub fn file_part(bytes: Vec<u8>, filename: &str, mime_type: &str) -> Part {
    Part::bytes(bytes).file_name(filename).mime_type(mime_type)
}

pub fn png_part(filename: &str) -> Part {
    file_part(create_test_png(), filename, "image/png")
}

/// Form with a single `file` part.
pub fn single_file_form(part: Part) -> MultipartForm {
    MultipartForm::new().add_part("file", part)
}

/// Form with one `files` part per entry, in order.
pub fn multi_file_form(parts: Vec<Part>) -> MultipartForm {
    parts
        .into_iter()
        .fold(MultipartForm::new(), |form, part| form.add_part("files", part))
}
