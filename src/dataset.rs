use image::DynamicImage;
use indicatif::ProgressBar;
use log::{error, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::assemble::assemble_record;
use crate::config::Args;
use crate::error::{Error, Result};
use crate::io::{
    collect_json_files, image_size, read_and_parse_json, save_jpeg, setup_output_directories,
    write_file, ImageDecoder, LabelmeImageDecoder,
};
use crate::label_map::LabelMapping;
use crate::naming::{plan_base_names, BaseNamer};
use crate::types::{OutputDirs, ProcessingStats, RecordOutcome};
use crate::utils::create_progress_bar;
use crate::visualize::{ImageprocRenderer, OverlayRenderer};
use crate::voc::{DocumentSerializer, VocXmlSerializer};
use crate::vocabulary::Vocabulary;

/// How a run walks its records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub base_namer: BaseNamer,
    /// Record failures and continue instead of stopping at the first one.
    pub keep_going: bool,
    pub parallel: bool,
}

/// The decode, serialize and draw implementations a run uses.
#[derive(Clone, Copy)]
pub struct Backends<'a> {
    pub decoder: &'a dyn ImageDecoder,
    pub serializer: &'a dyn DocumentSerializer,
    pub renderer: &'a dyn OverlayRenderer,
}

/// Writes the three per-record artifacts into a prepared output tree.
pub struct DatasetWriter<'a> {
    output_dirs: &'a OutputDirs,
    vocabulary: &'a Vocabulary,
    mapping: &'a LabelMapping,
    backends: Backends<'a>,
}

impl<'a> DatasetWriter<'a> {
    pub fn new(
        output_dirs: &'a OutputDirs,
        vocabulary: &'a Vocabulary,
        mapping: &'a LabelMapping,
        backends: Backends<'a>,
    ) -> Self {
        Self {
            output_dirs,
            vocabulary,
            mapping,
            backends,
        }
    }

    /// Convert one JSON file into `JPEGImages/<base>.jpg`,
    /// `Annotations/<base>.xml` and `AnnotationsVisualization/<base>.jpg`.
    pub fn process_record(&self, json_path: &Path, base: &str) -> Result<RecordOutcome> {
        let annotation = read_and_parse_json(json_path)?;
        let image = self.backends.decoder.decode(&annotation, json_path)?;

        let assembled = assemble_record(
            self.vocabulary,
            self.mapping,
            &format!("{}.jpg", base),
            image_size(&image),
            &annotation.shapes,
        )?;

        save_jpeg(&image, &self.output_dirs.image_path(base))?;

        let xml = self.backends.serializer.serialize(&assembled.document)?;
        write_file(&self.output_dirs.annotation_path(base), &xml)?;

        let overlay = self.backends.renderer.render(&image, &assembled.instances)?;
        save_jpeg(
            &DynamicImage::ImageRgb8(overlay),
            &self.output_dirs.visualization_path(base),
        )?;

        Ok(RecordOutcome {
            shapes_written: assembled.instances.len(),
            shapes_skipped: assembled.skipped_shapes,
        })
    }

    /// Process every planned record. Without `keep_going` the first failure
    /// is returned as is; with it, failures are logged and counted and the
    /// run ends in `Error::Incomplete` if any record failed. The summary is
    /// logged either way.
    pub fn write_all(
        &self,
        records: &[(PathBuf, String)],
        options: &ConvertOptions,
        pb: &ProgressBar,
    ) -> Result<ProcessingStats> {
        let (stats, result) = self.convert_records(records, options, pb);
        stats.print_summary();
        result?;

        if stats.failed_records > 0 {
            return Err(Error::Incomplete {
                failed: stats.failed_records,
                total: stats.total_records,
            });
        }
        Ok(stats)
    }

    /// Run the records and return what was counted alongside the first
    /// failure that stopped the run, if any.
    fn convert_records(
        &self,
        records: &[(PathBuf, String)],
        options: &ConvertOptions,
        pb: &ProgressBar,
    ) -> (ProcessingStats, Result<()>) {
        let stats = Mutex::new(ProcessingStats::new());

        let run_one = |(json_path, base): &(PathBuf, String)| -> Result<()> {
            let result = self
                .process_record(json_path, base)
                .map_err(|e| Error::Record {
                    path: json_path.clone(),
                    source: Box::new(e),
                });
            pb.inc(1);

            let mut stats = stats.lock().unwrap_or_else(PoisonError::into_inner);
            match result {
                Ok(outcome) => {
                    stats.record_success(outcome);
                    Ok(())
                }
                Err(e) => {
                    stats.record_failure();
                    if options.keep_going {
                        error!("{}", e);
                        Ok(())
                    } else {
                        Err(e)
                    }
                }
            }
        };

        let result = if options.parallel {
            records.par_iter().try_for_each(run_one)
        } else {
            records.iter().try_for_each(run_one)
        };

        let stats = stats.into_inner().unwrap_or_else(PoisonError::into_inner);
        (stats, result)
    }
}

/// Main dataset conversion pipeline with the default LabelMe, VOC XML and
/// imageproc backends.
pub fn process_dataset(args: &Args) -> Result<ProcessingStats> {
    let renderer = ImageprocRenderer::new(args.render_options())?;
    let serializer = VocXmlSerializer::default();
    process_dataset_with(
        args,
        Backends {
            decoder: &LabelmeImageDecoder,
            serializer: &serializer,
            renderer: &renderer,
        },
    )
}

/// Run the pipeline with caller-supplied backends.
///
/// Every precondition (input directory, labels, mapping, base names, output
/// directory) is checked before the first file is written.
pub fn process_dataset_with(args: &Args, backends: Backends<'_>) -> Result<ProcessingStats> {
    if !args.input_dir.is_dir() {
        return Err(Error::InputMissing(args.input_dir.clone()));
    }
    if args.output_dir.exists() {
        return Err(Error::OutputExists(args.output_dir.clone()));
    }

    let mapping = match &args.label_dict {
        Some(path) => LabelMapping::load(path)?,
        None => LabelMapping::new(),
    };
    let vocabulary = Vocabulary::load(&args.labels, &mapping)?;

    let options = args.convert_options();
    let records = plan_base_names(collect_json_files(&args.input_dir)?, options.base_namer)?;
    info!(
        "Found {} JSON files in {}",
        records.len(),
        args.input_dir.display()
    );

    let output_dirs = setup_output_directories(&args.output_dir)?;
    info!("Creating dataset: {}", output_dirs.root.display());
    vocabulary.save(&output_dirs.class_names_file)?;

    let pb = create_progress_bar(records.len() as u64, "Convert");
    let writer = DatasetWriter::new(&output_dirs, &vocabulary, &mapping, backends);
    let result = writer.write_all(&records, &options, &pb);
    pb.finish_and_clear();

    let stats = result?;
    info!("Conversion process completed successfully.");
    Ok(stats)
}
