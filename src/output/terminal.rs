// Colored terminal output for clustering results and sampling reports.
//
// This module handles all terminal-specific formatting. The main.rs
// commands delegate here.

use colored::Colorize;

use crate::entities::models::InputCluster;
use crate::reconcile::ClusteringOutput;
use crate::sampling::SamplingReport;

/// Display the reconciled clustering output, one line per signature.
pub fn display_clustering_output(block: &str, output: &ClusteringOutput) {
    println!(
        "\n{}",
        format!("=== Block {block} ({} signatures) ===", output.len()).bold()
    );

    if output.is_empty() {
        println!("  No signatures in this block.");
        return;
    }

    println!(
        "  {:>10}  {:<38} {}",
        "Record".dimmed(),
        "Signature".dimmed(),
        "Candidate authors".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    let mut unresolved = 0;
    let mut ambiguous = 0;
    for ((publication_id, signature_uuid), candidates) in output {
        let rendered = match candidates.as_slice() {
            [] => {
                unresolved += 1;
                "unresolved".dimmed().to_string()
            }
            [(author_id, has_claims)] => render_candidate(*author_id, *has_claims),
            many => {
                ambiguous += 1;
                many.iter()
                    .map(|&(author_id, has_claims)| render_candidate(author_id, has_claims))
                    .collect::<Vec<_>>()
                    .join(", ")
                    .yellow()
                    .to_string()
            }
        };
        println!("  {publication_id:>10}  {signature_uuid:<38} {rendered}");
    }

    println!();
    if ambiguous > 0 {
        println!("  {} {} signatures with several candidate authors", "~".yellow(), ambiguous);
    }
    if unresolved > 0 {
        println!("  {} {} signatures without a candidate author", "?".dimmed(), unresolved);
    }
}

fn render_candidate(author_id: i64, has_claims: bool) -> String {
    if has_claims {
        format!("{author_id} (claimed)").green().to_string()
    } else {
        author_id.to_string()
    }
}

/// Display a summary of input clusters.
pub fn display_input_clusters(clusters: &[InputCluster]) {
    let claimed = clusters.iter().filter(|c| c.author_id.is_some()).count();
    let claimed_signatures: usize = clusters
        .iter()
        .filter(|c| c.author_id.is_some())
        .map(|c| c.signature_uuids.len())
        .sum();
    println!("\n{}", "=== Input clusters ===".bold());
    println!("  Curated authors: {claimed} ({claimed_signatures} signatures)");
    println!("  Unclaimed singletons: {}", clusters.len() - claimed);
}

/// Display how the pair sample compares to what was requested.
pub fn display_sampling_report(report: &SamplingReport) {
    println!("\n{}", "=== Pair sampling ===".bold());
    println!("  Requested: {}", report.requested);
    println!("  Produced:  {}", report.produced);

    for bucket in &report.buckets {
        let label = if bucket.same_author { "same author" } else { "different author" };
        let line = format!(
            "  {:<17} {:<18} {:>6}/{}",
            label, bucket.category, bucket.drawn, bucket.quota
        );
        if bucket.exhausted {
            println!("{}", line.yellow());
        } else {
            println!("{line}");
        }
    }

    if report.shortfall() > 0 {
        println!(
            "\n  {} {} pairs short: the corpus has too few distinct pairs for some categories",
            "Warning:".yellow(),
            report.shortfall()
        );
    }
}
