//! Progress Reporter (C8): a pure `(done, total) -> String` textual meter.
//! Purely cosmetic — never fails, never blocks, and treats `0/0` as complete.

const BAR_WIDTH: usize = 50;

const MOOD_GLYPHS: [&str; 13] = [
    "😢", "😟", "😕", "🙁", "😐", "🙂", "😊", "😄", "😁", "😃", "😆", "🤩", "🎉",
];

/// Render a progress line for `done` out of `total` completed units.
///
/// `total == 0` is treated as 100% complete (0/0, nothing to do, nothing
/// left undone) rather than as a division error.
pub fn render_progress(done: u64, total: u64) -> String {
    let fraction = if total == 0 {
        1.0
    } else {
        (done as f64 / total as f64).clamp(0.0, 1.0)
    };

    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar: String = "*".repeat(filled) + &"·".repeat(BAR_WIDTH - filled);

    let percent = (fraction * 100.0).round() as u64;
    let glyph_index = ((fraction * (MOOD_GLYPHS.len() - 1) as f64).round() as usize)
        .min(MOOD_GLYPHS.len() - 1);
    let glyph = MOOD_GLYPHS[glyph_index];

    format!("[{bar}] {percent}% {glyph} ({done}/{total})")
}
