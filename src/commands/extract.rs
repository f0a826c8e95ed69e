use anyhow::Result;
use tracing::info;

use crate::cli::ExtractArgs;
use crate::commands::write_json_stdout;
use crate::extract::Extractor;
use crate::model::{DocumentResult, WaiverDetails};
use crate::pipeline::Pipeline;
use crate::source::{PdfToText, TesseractLayout};

pub fn run(args: ExtractArgs) -> Result<()> {
    let extractor = Extractor::new(args.extraction.extraction_config())?;
    let source_config = args.extraction.source_config();
    let token_layer = TesseractLayout::new(&args.extraction.ocr_lang, args.extraction.ocr_dpi);

    let pipeline = Pipeline {
        extractor: &extractor,
        source_config: &source_config,
        text_layer: &PdfToText,
        token_layer: &token_layer,
        store: None,
    };

    let result = pipeline.process(&args.input, args.category.category())?;

    if args.json {
        write_json_stdout(&result)?;
    } else {
        print_summary(&result);
    }

    info!(
        path = %args.input.display(),
        method = result.extraction_method.as_str(),
        "extraction completed"
    );
    Ok(())
}

fn print_summary(result: &DocumentResult) {
    println!("source: {}", result.source.path);
    println!("category: {}", result.category.as_str());
    println!("method: {}", result.extraction_method.as_str());
    if let Some(strategy) = &result.row_strategy {
        println!("row strategy: {strategy}");
    }
    println!(
        "approver: {}",
        result.metadata.approver_email.as_deref().unwrap_or("-")
    );
    println!(
        "approved at: {}",
        result.metadata.approval_timestamp.as_deref().unwrap_or("-")
    );

    if let WaiverDetails::Records(records) = &result.waiver_details {
        for record in records {
            println!(
                "{}\tpenal={}\tbounce={}\ttotal={}\t{}",
                record.agreement_id,
                record.penal_charge,
                record.bounce_charge,
                record.total_waived,
                record.reason
            );
        }
    }

    if let Some(references) = &result.references {
        for reference in &references.fin_reference_no {
            println!("reference: {reference}");
        }
    }

    for warning in &result.warnings {
        println!("warning: {warning}");
    }
}
