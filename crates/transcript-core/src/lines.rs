use std::cmp::Ordering;

use crate::token::{Line, Token};

/// Cluster a page's tokens into visual lines by vertical position.
///
/// Positions are sorted ascending and chained: a token joins the current
/// line when its `top` is at most `tolerance` below the previous position in
/// that line (closed interval, so a gap of exactly `tolerance` still joins).
/// Lines come back in ascending vertical order. Tokens inside a line keep
/// the order in which they appeared in `tokens`.
///
/// A negative or NaN tolerance is treated as 0.
pub fn cluster_tokens_into_lines(tokens: &[Token], tolerance: f64) -> Vec<Line> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let tolerance = tolerance.max(0.0);

    let mut by_position: Vec<usize> = (0..tokens.len()).collect();
    by_position.sort_by(|&a, &b| tokens[a].top.total_cmp(&tokens[b].top));

    let mut cluster_of = vec![0usize; tokens.len()];
    let mut cluster = 0usize;
    let mut previous: Option<f64> = None;
    for &i in &by_position {
        let top = tokens[i].top;
        if let Some(prev) = previous {
            let joins = top <= prev + tolerance;
            if !joins {
                cluster += 1;
            }
        }
        cluster_of[i] = cluster;
        previous = Some(top);
    }

    // Stable sort keeps stream order inside each cluster.
    let mut in_stream_order: Vec<usize> = (0..tokens.len()).collect();
    in_stream_order.sort_by_key(|&i| cluster_of[i]);

    let mut lines: Vec<Line> = Vec::with_capacity(cluster + 1);
    let mut current_cluster: Option<usize> = None;
    for i in in_stream_order {
        let token = &tokens[i];
        match lines.last_mut() {
            Some(line) if current_cluster == Some(cluster_of[i]) => {
                if token.top.total_cmp(&line.top) == Ordering::Less {
                    line.top = token.top;
                }
                line.tokens.push(token.clone());
            }
            _ => {
                lines.push(Line {
                    tokens: vec![token.clone()],
                    top: token.top,
                });
                current_cluster = Some(cluster_of[i]);
            }
        }
    }

    lines
}
