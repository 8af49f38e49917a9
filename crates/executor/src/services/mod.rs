pub mod console_service;
pub mod telegram_service;

pub use console_service::ConsoleService;
pub use telegram_service::TelegramService;
