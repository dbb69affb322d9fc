//! TIFF / OME-TIFF backend built on the `tiff` crate.
//!
//! ## Series
//!
//! Pages are grouped into series by consecutive runs of identical layout
//! (width, height, sample type). With `concatenate` set, a later series whose
//! layout matches an earlier one is appended to that earlier series.
//!
//! ## Export
//!
//! One uncompressed grayscale page per plane. The first page carries an
//! OME-XML `ImageDescription` with the stack geometry and pixel type.

use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, Write};
use std::path::Path;

use log::{debug, info};
use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder, TiffValue};
use tiff::tags::Tag;
use tiff::{ColorType, TiffResult};

use super::{ExportParams, ImageIo, ImporterOptions};
use crate::error::{Result, StackFilterError};
use crate::stack::{ImageStack, Plane, SampleType};

const OME_NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06";

/// Reads and writes (OME-)TIFF files.
#[derive(Debug, Default, Clone, Copy)]
pub struct OmeTiffIo;

impl OmeTiffIo {
    pub fn new() -> Self {
        OmeTiffIo
    }
}

impl ImageIo for OmeTiffIo {
    fn open(&self, path: &Path, options: &ImporterOptions) -> Result<Vec<ImageStack>> {
        let file = File::open(path).map_err(|source| StackFilterError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decode_err = |e: tiff::TiffError| StackFilterError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut decoder = Decoder::new(BufReader::new(file))
            .map_err(decode_err)?
            .with_limits(Limits::unlimited());

        if options.show_metadata {
            if let Ok(description) = decoder.get_tag_ascii_string(Tag::ImageDescription) {
                info!("Image description: {description}");
            }
        }

        let mut pages = Vec::new();
        loop {
            pages.push(read_page(&mut decoder, path)?);
            if !decoder.more_images() {
                break;
            }
            decoder.next_image().map_err(decode_err)?;
        }
        debug!("Decoded {} page(s) from {}", pages.len(), path.display());

        let base_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut series = group_series(&base_name, pages)?;

        if options.concatenate {
            series = concatenate_compatible(series)?;
        }
        if !options.open_all_series {
            series.truncate(1);
        }
        if options.autoscale {
            for stack in &mut series {
                stack.autoscale();
            }
        }

        Ok(series)
    }

    fn export(&self, stack: &ImageStack, path: &Path, params: &ExportParams) -> Result<()> {
        let export_err = |message: String| StackFilterError::Export {
            path: path.to_path_buf(),
            message,
        };

        let Some((height, width)) = stack.dim() else {
            return Err(export_err("stack has no planes".to_string()));
        };
        debug!("Exporting {} plane(s) to {} ({params})", stack.len(), path.display());

        let file = File::create(path).map_err(|e| export_err(e.to_string()))?;
        let mut encoder =
            TiffEncoder::new(BufWriter::new(file)).map_err(|e| export_err(e.to_string()))?;

        let description = ome_xml(stack);
        for (index, plane) in stack.planes().iter().enumerate() {
            let description = (index == 0).then_some(description.as_str());
            write_plane(&mut encoder, plane, width as u32, height as u32, description)
                .map_err(|e| export_err(e.to_string()))?;
        }

        Ok(())
    }
}

// ============================================================================
// Decoding
// ============================================================================

fn read_page<R: std::io::Read + Seek>(decoder: &mut Decoder<R>, path: &Path) -> Result<Plane> {
    let decode_err = |e: tiff::TiffError| StackFilterError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let unsupported = |description: String| StackFilterError::UnsupportedSampleType {
        path: path.to_path_buf(),
        description,
    };

    let (width, height) = decoder.dimensions().map_err(decode_err)?;
    let color_type = decoder.colortype().map_err(decode_err)?;
    if !matches!(color_type, ColorType::Gray(_)) {
        return Err(unsupported(format!("{color_type:?}")));
    }

    let shape = (height as usize, width as usize);
    let shape_err = |e: ndarray::ShapeError| StackFilterError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    match decoder.read_image().map_err(decode_err)? {
        DecodingResult::U8(data) => Array2::from_shape_vec(shape, data)
            .map(Plane::Gray8)
            .map_err(shape_err),
        DecodingResult::U16(data) => Array2::from_shape_vec(shape, data)
            .map(Plane::Gray16)
            .map_err(shape_err),
        DecodingResult::F32(data) => Array2::from_shape_vec(shape, data)
            .map(Plane::Gray32Float)
            .map_err(shape_err),
        _ => Err(unsupported(format!("{color_type:?} samples"))),
    }
}

fn layout(plane: &Plane) -> ((usize, usize), SampleType) {
    (plane.dim(), plane.sample_type())
}

/// Split pages into series at every change of layout.
fn group_series(base_name: &str, pages: Vec<Plane>) -> Result<Vec<ImageStack>> {
    let mut runs: Vec<Vec<Plane>> = Vec::new();
    for page in pages {
        match runs.last_mut() {
            Some(run) if run.last().map(layout) == Some(layout(&page)) => run.push(page),
            _ => runs.push(vec![page]),
        }
    }

    let count = runs.len();
    runs.into_iter()
        .enumerate()
        .map(|(i, planes)| {
            let name = if count == 1 {
                base_name.to_string()
            } else {
                format!("{base_name} #{}", i + 1)
            };
            ImageStack::new(name, planes)
        })
        .collect()
}

/// Merge each series into the first earlier series of the same layout.
fn concatenate_compatible(series: Vec<ImageStack>) -> Result<Vec<ImageStack>> {
    let mut merged: Vec<ImageStack> = Vec::with_capacity(series.len());
    for stack in series {
        let key = (stack.dim(), stack.sample_type());
        match merged
            .iter_mut()
            .find(|m| (m.dim(), m.sample_type()) == key)
        {
            Some(target) => target.concatenate(stack)?,
            None => merged.push(stack),
        }
    }
    Ok(merged)
}

// ============================================================================
// Encoding
// ============================================================================

fn write_plane<W: Write + Seek>(
    encoder: &mut TiffEncoder<W>,
    plane: &Plane,
    width: u32,
    height: u32,
    description: Option<&str>,
) -> TiffResult<()> {
    match plane {
        Plane::Gray8(data) => {
            let samples: Vec<u8> = data.iter().copied().collect();
            write_page::<W, colortype::Gray8>(encoder, width, height, &samples, description)
        }
        Plane::Gray16(data) => {
            let samples: Vec<u16> = data.iter().copied().collect();
            write_page::<W, colortype::Gray16>(encoder, width, height, &samples, description)
        }
        Plane::Gray32Float(data) => {
            let samples: Vec<f32> = data.iter().copied().collect();
            write_page::<W, colortype::Gray32Float>(encoder, width, height, &samples, description)
        }
    }
}

fn write_page<W: Write + Seek, C: colortype::ColorType>(
    encoder: &mut TiffEncoder<W>,
    width: u32,
    height: u32,
    samples: &[C::Inner],
    description: Option<&str>,
) -> TiffResult<()>
where
    [C::Inner]: TiffValue,
{
    let mut image = encoder.new_image::<C>(width, height)?;
    if let Some(description) = description {
        image.encoder().write_tag(Tag::ImageDescription, description)?;
    }
    image.write_data(samples)
}

/// Minimal OME-XML block describing a single-channel Z stack.
///
/// An autoscaled display range is stored as a map annotation on the image.
fn ome_xml(stack: &ImageStack) -> String {
    let (height, width) = stack.dim().unwrap_or((0, 0));
    let pixel_type = stack.sample_type().map(SampleType::ome_name).unwrap_or("uint8");
    let planes = stack.len();

    let (annotation_ref, annotations) = match stack.display_range() {
        Some((lo, hi)) => (
            r#"<AnnotationRef ID="Annotation:0"/>"#.to_string(),
            format!(
                concat!(
                    r#"<StructuredAnnotations><MapAnnotation ID="Annotation:0"><Value>"#,
                    r#"<M K="DisplayRangeMin">{lo}</M><M K="DisplayRangeMax">{hi}</M>"#,
                    r#"</Value></MapAnnotation></StructuredAnnotations>"#
                ),
                lo = lo,
                hi = hi,
            ),
        ),
        None => (String::new(), String::new()),
    };

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<OME xmlns="{ns}">"#,
            r#"<Image ID="Image:0" Name="{name}">"#,
            r#"<Pixels ID="Pixels:0" DimensionOrder="XYZCT" Type="{ty}" "#,
            r#"SizeX="{w}" SizeY="{h}" SizeZ="{z}" SizeC="1" SizeT="1">"#,
            r#"<Channel ID="Channel:0:0" SamplesPerPixel="1"/>"#,
            r#"<TiffData IFD="0" PlaneCount="{z}"/>"#,
            r#"</Pixels>{annotation_ref}</Image>{annotations}</OME>"#
        ),
        ns = OME_NAMESPACE,
        name = escape_xml(stack.name()),
        ty = pixel_type,
        w = width,
        h = height,
        z = planes,
        annotation_ref = annotation_ref,
        annotations = annotations,
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray8(h: usize, w: usize, value: u8) -> Plane {
        Plane::Gray8(Array2::from_elem((h, w), value))
    }

    #[test]
    fn test_group_series_splits_on_layout_change() {
        let pages = vec![gray8(4, 4, 1), gray8(4, 4, 2), gray8(2, 2, 3), gray8(4, 4, 4)];
        let series = group_series("cells.tif", pages).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].len(), 2);
        assert_eq!(series[0].name(), "cells.tif #1");
        assert_eq!(series[1].dim(), Some((2, 2)));
    }

    #[test]
    fn test_concatenate_merges_matching_layouts() {
        let pages = vec![gray8(4, 4, 1), gray8(2, 2, 3), gray8(4, 4, 4)];
        let series = group_series("x.tif", pages).unwrap();
        let merged = concatenate_compatible(series).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].len(), 2);
        assert_eq!(merged[0].planes()[1], gray8(4, 4, 4));
    }

    #[test]
    fn test_ome_xml_describes_stack() {
        let stack = ImageStack::new("a<b", vec![gray8(3, 5, 0), gray8(3, 5, 0)]).unwrap();
        let xml = ome_xml(&stack);

        assert!(xml.contains(r#"SizeX="5" SizeY="3" SizeZ="2""#));
        assert!(xml.contains(r#"Type="uint8""#));
        assert!(xml.contains("a&lt;b"));
        assert!(!xml.contains("DisplayRange"));
    }

    #[test]
    fn test_ome_xml_carries_display_range() {
        let mut data = Array2::<u8>::from_elem((2, 2), 12);
        data[[1, 0]] = 250;
        let mut stack = ImageStack::new("s", vec![Plane::Gray8(data)]).unwrap();
        stack.autoscale();

        let xml = ome_xml(&stack);

        assert!(xml.contains(r#"<M K="DisplayRangeMin">12</M>"#));
        assert!(xml.contains(r#"<M K="DisplayRangeMax">250</M>"#));
        assert!(xml.contains(r#"<AnnotationRef ID="Annotation:0"/></Image>"#));
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.ome.tiff");

        let mut a = Array2::<u16>::zeros((6, 4));
        a[[5, 3]] = 1234;
        let b = Array2::<u16>::from_elem((6, 4), 9);
        let stack =
            ImageStack::new("stack", vec![Plane::Gray16(a.clone()), Plane::Gray16(b)]).unwrap();

        let io = OmeTiffIo::new();
        io.export(&stack, &path, &ExportParams::ome_tiff()).unwrap();
        let series = io.open(&path, &ImporterOptions::pipeline()).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].len(), 2);
        assert_eq!(series[0].planes()[0], Plane::Gray16(a));
        assert_eq!(series[0].display_range(), Some((0.0, 1234.0)));
    }

    #[test]
    fn test_open_missing_file_is_open_error() {
        let err = OmeTiffIo::new()
            .open(Path::new("/nonexistent/never.tif"), &ImporterOptions::pipeline())
            .unwrap_err();
        assert!(matches!(err, StackFilterError::Open { .. }));
    }

    #[test]
    fn test_export_empty_stack_fails() {
        let dir = tempfile::tempdir().unwrap();
        let stack = ImageStack::new("empty", Vec::new()).unwrap();
        let err = OmeTiffIo::new()
            .export(&stack, &dir.path().join("e.ome.tiff"), &ExportParams::ome_tiff())
            .unwrap_err();
        assert!(matches!(err, StackFilterError::Export { .. }));
    }
}
