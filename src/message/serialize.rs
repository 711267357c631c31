//! Outbound line rendering.

/// Render `COMMAND[ params...][ :trail]` without the line terminator.
pub(super) fn render_line(command: &str, params: &[String], trail: Option<&str>) -> String {
    let capacity = command.len()
        + params.iter().map(|p| p.len() + 1).sum::<usize>()
        + trail.map_or(0, |t| t.len() + 2);
    let mut line = String::with_capacity(capacity);

    line.push_str(command);
    for param in params {
        line.push(' ');
        line.push_str(param);
    }
    if let Some(trail) = trail.filter(|t| !t.is_empty()) {
        line.push_str(" :");
        line.push_str(trail);
    }
    line
}
