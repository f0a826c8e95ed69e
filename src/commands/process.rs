use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{error, info};

use crate::cli::ProcessArgs;
use crate::commands::{collect_inputs, open_store, write_json_stdout};
use crate::extract::Extractor;
use crate::model::DocumentResult;
use crate::pipeline::Pipeline;
use crate::source::{PdfToText, TesseractLayout};
use crate::util::{ensure_directory, write_json_pretty};

pub fn run(args: ProcessArgs) -> Result<()> {
    let documents = collect_inputs(&args.inputs)?;
    let extractor = Extractor::new(args.extraction.extraction_config())?;
    let source_config = args.extraction.source_config();
    let store = open_store(&args.store)?;
    let token_layer = TesseractLayout::new(&args.extraction.ocr_lang, args.extraction.ocr_dpi);

    let pipeline = Pipeline {
        extractor: &extractor,
        source_config: &source_config,
        text_layer: &PdfToText,
        token_layer: &token_layer,
        store: Some(store.as_ref()),
    };

    ensure_directory(&args.output_dir)?;
    info!(
        documents = documents.len(),
        ocr_mode = source_config.ocr_mode.as_str(),
        output_dir = %args.output_dir.display(),
        "starting waiver processing"
    );

    let mut results = Vec::with_capacity(documents.len());
    let mut failed = 0_usize;
    for path in &documents {
        match pipeline.process(path, args.category.category()) {
            Ok(result) => {
                let output_path = result_path(&args.output_dir, path)?;
                write_json_pretty(&output_path, &result)?;
                info!(path = %output_path.display(), "wrote decision report");
                results.push(result);
            }
            Err(err) => {
                failed += 1;
                error!(path = %path.display(), error = %format!("{err:#}"), "document failed");
            }
        }
    }

    if args.json {
        write_json_stdout(&results)?;
    }

    info!(
        processed = results.len(),
        failed,
        records = total_details(&results),
        "waiver processing completed"
    );

    if failed > 0 {
        bail!("{failed} of {} documents could not be processed", documents.len());
    }
    Ok(())
}

fn result_path(output_dir: &Path, source: &Path) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("invalid UTF-8 filename: {}", source.display()))?;
    Ok(output_dir.join(format!("{stem}.json")))
}

fn total_details(results: &[DocumentResult]) -> usize {
    results
        .iter()
        .map(|result| result.waiver_details.len())
        .sum()
}
