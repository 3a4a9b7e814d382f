#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Вид пользовательского уведомления.
pub enum NoticeKind {
    /// Операция завершилась успешно.
    Success,
    /// Операция завершилась ошибкой.
    Error,
    /// Нейтральное информационное сообщение.
    Info,
}

/// Канал пользовательских уведомлений.
///
/// Логика запросов и оркестрации не знает про конкретный UI: CLI
/// печатает уведомления в консоль, wasm-фронтенд показывает баннер.
/// Ошибки сети всегда уходят в этот канал и никогда не роняют view.
pub trait Notifier {
    /// Показывает уведомление пользователю.
    fn notify(&self, kind: NoticeKind, message: &str);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::cell::RefCell;

    /// Записывающий notifier для unit-тестов.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        pub notices: RefCell<Vec<(NoticeKind, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, kind: NoticeKind, message: &str) {
            self.notices.borrow_mut().push((kind, message.to_string()));
        }
    }
}
