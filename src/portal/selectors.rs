//! Locators for the portal's rendered form and result cards.
//!
//! These mirror the observed MUI class structure of the search page. They are
//! opaque selector strings to the rest of the crate; only the driving backend
//! interprets them.

use crate::driver::Locator;

/// The iframe the whole search UI renders inside.
pub fn content_frame() -> Locator {
    Locator::css("[name='TargetContent']")
}

/// The search form root; its presence marks a completed page (re)load.
pub fn form_root() -> Locator {
    Locator::css("form")
}

/// Button opening the term dropdown.
pub fn term_dropdown() -> Locator {
    Locator::xpath("//form//div[2]//button")
}

/// The term dropdown's option list.
pub fn term_option_list() -> Locator {
    Locator::xpath("//form//div[2]//ul")
}

/// Popup-indicator buttons for the autocomplete controls. Index 1 opens the
/// academic career dropdown, index 2 the subject dropdown.
pub fn popup_indicators() -> Locator {
    Locator::xpath(
        "//form//div[2]//button[@class='cx-MuiButtonBase-root cx-MuiIconButton-root \
         cx-MuiAutocomplete-popupIndicator']",
    )
}

pub const CAREER_POPUP_INDEX: usize = 1;
pub const SUBJECT_POPUP_INDEX: usize = 2;

/// Whichever dropdown is currently open renders its options here.
pub fn open_option_list() -> Locator {
    Locator::xpath("//form//ul")
}

/// Options inside a dropdown list.
pub fn option_items() -> Locator {
    Locator::xpath(".//li")
}

/// The "show open classes only" checkbox.
pub fn open_only_checkbox() -> Locator {
    Locator::xpath("//input[@type='checkbox']")
}

pub fn search_button() -> Locator {
    Locator::xpath("//button[@type='submit']")
}

/// Pagination element that appears once search results have rendered.
pub fn results_marker() -> Locator {
    Locator::xpath("//div[2]//nav")
}

/// Children of the results grid; the card area is the third one.
pub fn results_containers() -> Locator {
    Locator::xpath(
        "//div[@class='cx-MuiGrid-root cx-MuiGrid-container cx-MuiGrid-spacing-xs-1 \
         cx-MuiGrid-direction-xs-column']/child::div",
    )
}

pub const RESULTS_CONTAINER_INDEX: usize = 2;

/// Card groups inside the results area.
pub fn card_groups() -> Locator {
    Locator::xpath("./div/child::div")
}

/// Course cards inside a group. The first match is the group header, not a card.
pub fn cards_in_group() -> Locator {
    Locator::xpath("./div[@class='cx-MuiGrid-root cx-MuiGrid-item cx-MuiGrid-grid-xs-12']")
}

/// A card's header (`"<name> | <subjectCode> <catalogNumber>"`).
pub fn card_title() -> Locator {
    Locator::css("h2")
}

/// The screen-reader-only token spans; the first one is decorative.
pub fn card_tokens() -> Locator {
    Locator::xpath(".//span[@class='sr-only']")
}

/// Per-section table inside a card, holding the detail toggle buttons.
pub fn card_section_table() -> Locator {
    Locator::xpath(".//div[@role='table']")
}

/// Detail toggle buttons, one per section row.
pub fn section_detail_buttons() -> Locator {
    Locator::xpath(".//button[@class='MuiButtonBase-root MuiIconButton-root']")
}

/// The expanded meeting-patterns table.
pub fn meeting_patterns_table() -> Locator {
    Locator::css("[aria-label='meeting patterns']")
}

/// Cell paragraphs of the meeting-patterns table, in row-major order.
pub fn meeting_patterns_cells() -> Locator {
    Locator::xpath(".//tbody//p")
}
