//! Progress milestones and step labels.
//!
//! Percentages are fixed weights per stage; the page loop interpolates
//! linearly between the sheet stage and document assembly.

/// Preview: premise generation underway.
pub const PREVIEW_PREMISE: (&str, u8) = ("Creating the story idea", 20);
/// Preview: cover generation underway.
pub const PREVIEW_COVER: (&str, u8) = ("Transforming into a magical cover", 60);
/// Preview finished.
pub const PREVIEW_READY: (&str, u8) = ("Preview ready", 100);
/// Cover regeneration underway.
pub const COVER_REGEN: (&str, u8) = ("Regenerating cover", 50);

/// Completion: pipeline starting.
pub const COMPLETION_START: (&str, u8) = ("Starting full generation", 0);
/// Completion: narrative expansion underway.
pub const COMPLETION_EXPAND: (&str, u8) = ("Extending the full story", 5);
/// Completion: character sheet underway.
pub const COMPLETION_CHARACTERS: (&str, u8) = ("Creating characters from the cover", 10);
/// Completion: scene sheet underway.
pub const COMPLETION_SCENES: (&str, u8) = ("Creating the scenes", 20);
/// Completion: document assembly underway.
pub const COMPLETION_DOCUMENT: (&str, u8) = ("Creating the final document", 95);
/// Completion finished.
pub const COMPLETION_DONE: (&str, u8) = ("Book completed", 100);

/// Page-stage floor and span of the progress range.
const PAGE_FLOOR: f32 = 20.0;
const PAGE_SPAN: f32 = 70.0;

/// Progress while generating page `page` of `total`, linear from 20 to 90.
pub fn page_progress(page: u32, total: u32) -> u8 {
    if total == 0 {
        return PAGE_FLOOR as u8;
    }
    (PAGE_FLOOR + (page as f32 / total as f32) * PAGE_SPAN) as u8
}

/// Step label for page `page` of `total`.
pub fn page_step(page: u32, total: u32) -> String {
    format!("Generating page {page}/{total}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_progress_is_linear_and_bounded() {
        assert_eq!(page_progress(1, 12), 25);
        assert_eq!(page_progress(12, 12), 90);
        assert!(page_progress(6, 12) > page_progress(1, 12));
        assert!(page_progress(12, 12) < COMPLETION_DOCUMENT.1);
    }
}
