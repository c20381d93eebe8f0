use std::path::Path;

use image::ImageError;

use crate::scene::{TextureData, TextureImage};

use super::AssetError;

/// Decode any supported image file to RGBA8
pub fn decode_image(path: &Path) -> Result<TextureImage, AssetError> {
    let decoded = image::open(path).map_err(|err| match err {
        ImageError::IoError(source) => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        ImageError::Unsupported(detail) => AssetError::UnsupportedFormat {
            path: path.to_path_buf(),
            detail: detail.to_string(),
        },
        other => AssetError::Decode {
            path: path.to_path_buf(),
            source: other,
        },
    })?;
    let rgba = decoded.to_rgba8();
    Ok(TextureImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// Six faces in +X, -X, +Y, -Y, +Z, -Z order; all square and the same size
pub fn decode_cube<P: AsRef<Path>>(faces: &[P; 6]) -> Result<TextureData, AssetError> {
    let mut decoded = Vec::with_capacity(6);
    for face in faces {
        decoded.push(decode_image(face.as_ref())?);
    }

    let size = decoded[0].width;
    for (face, image) in faces.iter().zip(&decoded) {
        if image.width != image.height || image.width != size {
            return Err(AssetError::UnsupportedFormat {
                path: face.as_ref().to_path_buf(),
                detail: format!(
                    "cube face is {}x{}, expected {}x{}",
                    image.width, image.height, size, size
                ),
            });
        }
    }

    let faces: [TextureImage; 6] = decoded
        .try_into()
        .map_err(|_| AssetError::UnsupportedFormat {
            path: faces[0].as_ref().to_path_buf(),
            detail: "cube map needs exactly six faces".into(),
        })?;
    Ok(TextureData::Cube(Box::new(faces)))
}
