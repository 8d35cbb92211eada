/*
 * Fixed texts used by the application logic when describing the file manager
 * window to the front end.
 */

pub const WINDOW_TITLE_PREFIX: &str = "Manage files for: ";

pub const TREE_ACTION_ADD_LABEL: &str = "Add to Merge List";
pub const TREE_ACTION_REMOVE_LABEL: &str = "Remove from Merge List";

pub const CHECKED_BOX_CHAR: char = '☑';
pub const UNCHECKED_BOX_CHAR: char = '☐';

pub const STATUS_SELECTION_SAVED: &str = "File selection and order saved to .allcode";

pub const FILE_NOT_FOUND_TITLE: &str = "File Not Found";
pub const UNSUPPORTED_ACTION_TITLE: &str = "Unsupported Action";
pub const UNSUPPORTED_ACTION_TEXT: &str =
    "Could not open file with the system default.\nPlease configure a default editor in Settings.";
pub const ERROR_TITLE: &str = "Error";
