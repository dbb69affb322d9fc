//! Open, select a series, filter.

use std::path::Path;

use log::{info, warn};

use crate::error::{Result, StackFilterError};
use crate::filters::FilterSelection;
use crate::io::{ImageIo, ImporterOptions};
use crate::slices;
use crate::stack::ImageStack;

/// Loads one series of an image and applies the selected rank filter.
///
/// Images are always opened with [`ImporterOptions::pipeline`]: all series,
/// no metadata display, compatible series concatenated, autoscaled.
#[derive(Debug, Clone)]
pub struct ImagePipeline<I> {
    io: I,
    selection: FilterSelection,
    radius: f64,
}

impl<I: ImageIo> ImagePipeline<I> {
    pub fn new(io: I, selection: FilterSelection, radius: f64) -> Self {
        ImagePipeline {
            io,
            selection,
            radius,
        }
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    /// Run the pipeline on `image_path`.
    ///
    /// # Returns
    /// The (possibly filtered) stack of series `series_index`
    pub fn run(&self, image_path: &Path, series_index: usize) -> Result<ImageStack> {
        info!("Image Filename : {}", image_path.display());

        let mut series = self.io.open(image_path, &ImporterOptions::pipeline())?;
        let available = series.len();
        if series_index >= available {
            return Err(StackFilterError::SeriesIndex {
                index: series_index,
                available,
            });
        }
        let mut stack = series.swap_remove(series_index);
        if let Some((lo, hi)) = stack.display_range() {
            info!("Display range : {lo} - {hi}");
        }

        match &self.selection {
            FilterSelection::None => {
                info!("No filter selected. Do nothing.");
            }
            FilterSelection::Unknown(unknown) => {
                warn!("{unknown}; leaving image unfiltered");
            }
            FilterSelection::Kernel(kernel) => {
                info!("Apply Filter  : {kernel}");
                info!("Filter Radius : {}", self.radius);
                slices::apply(&mut stack, *kernel, self.radius);
            }
        }

        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnknownFilter;
    use crate::filters::RankKernel;
    use crate::io::ExportParams;
    use crate::stack::Plane;
    use ndarray::Array2;
    use std::cell::RefCell;

    /// Serves a fixed list of series and records the options it was opened with.
    struct FixedIo {
        series: Vec<ImageStack>,
        opened_with: RefCell<Option<ImporterOptions>>,
    }

    impl FixedIo {
        fn new(series: Vec<ImageStack>) -> Self {
            FixedIo {
                series,
                opened_with: RefCell::new(None),
            }
        }
    }

    impl ImageIo for FixedIo {
        fn open(&self, _path: &Path, options: &ImporterOptions) -> Result<Vec<ImageStack>> {
            *self.opened_with.borrow_mut() = Some(*options);
            Ok(self.series.clone())
        }

        fn export(&self, _stack: &ImageStack, _path: &Path, _params: &ExportParams) -> Result<()> {
            Ok(())
        }
    }

    fn speckled(name: &str, value: u8) -> ImageStack {
        let planes = (0..3)
            .map(|_| {
                let mut data = Array2::<u8>::from_elem((8, 8), value);
                data[[4, 4]] = 255;
                Plane::Gray8(data)
            })
            .collect();
        ImageStack::new(name, planes).unwrap()
    }

    #[test]
    fn test_no_filter_returns_input_unchanged() {
        let input = speckled("s0", 10);
        let io = FixedIo::new(vec![input.clone()]);
        let pipeline = ImagePipeline::new(io, FilterSelection::None, 3.0);

        let output = pipeline.run(Path::new("in.tif"), 0).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn test_unknown_filter_returns_input_unchanged() {
        let input = speckled("s0", 10);
        let selection = FilterSelection::Unknown(UnknownFilter("GAUSSIAN".to_string()));
        let pipeline = ImagePipeline::new(FixedIo::new(vec![input.clone()]), selection, 3.0);

        assert_eq!(pipeline.run(Path::new("in.tif"), 0).unwrap(), input);
    }

    #[test]
    fn test_selects_requested_series_and_filters() {
        let io = FixedIo::new(vec![speckled("s0", 10), speckled("s1", 20)]);
        let pipeline = ImagePipeline::new(io, FilterSelection::Kernel(RankKernel::Median), 1.0);

        let output = pipeline.run(Path::new("in.tif"), 1).unwrap();

        assert_eq!(output.name(), "s1");
        assert_eq!(output.len(), 3);
        for plane in output.planes() {
            assert_eq!(plane, &Plane::Gray8(Array2::from_elem((8, 8), 20)));
        }
        assert_eq!(
            *pipeline.io().opened_with.borrow(),
            Some(ImporterOptions::pipeline())
        );
    }

    #[test]
    fn test_series_out_of_range() {
        let io = FixedIo::new(vec![speckled("s0", 10), speckled("s1", 20)]);
        let pipeline = ImagePipeline::new(io, FilterSelection::Kernel(RankKernel::Mean), 2.0);

        let err = pipeline.run(Path::new("in.tif"), 5).unwrap_err();

        assert!(matches!(
            err,
            StackFilterError::SeriesIndex {
                index: 5,
                available: 2
            }
        ));
    }
}
