mod current_user;
mod error;
mod health;
mod images;
mod pagination;
mod style_guides;
mod transcriptions;
mod usage;

pub use current_user::{CurrentUser, USER_ID_HEADER};
pub use error::{ApiError, ErrorResponse};
pub use health::health_handler;
pub use images::{
    delete_image_handler, generate_image_handler, get_image_data_handler, get_image_handler,
    list_images_for_transcription_handler, list_images_handler,
};
pub use pagination::Pagination;
pub use style_guides::{
    create_style_guide_handler, delete_style_guide_handler, generate_style_guide_handler,
    get_style_guide_handler, list_style_guides_handler, set_default_style_guide_handler,
    update_style_guide_handler,
};
pub use transcriptions::{
    delete_audio_handler, delete_transcription_handler, get_audio_handler,
    get_transcription_handler, list_transcriptions_handler, process_transcription_handler,
    transcribe_handler, update_transcription_handler,
};
pub use usage::{list_usage_handler, usage_summary_handler};
