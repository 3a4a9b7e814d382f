use crate::models::{Post, PostPage};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Параметры одного запроса списка постов.
///
/// Значение выдаёт [`PostFeed`]; вызывающая сторона выполняет запрос
/// и возвращает результат в [`PostFeed::apply`] вместе с этим же
/// значением, чтобы устаревшие ответы можно было отбросить.
pub struct FeedQuery {
    /// Номер запрашиваемой страницы (с 1).
    pub page: u32,
    /// Размер страницы.
    pub limit: u32,
    /// Поисковая строка, если задана.
    pub search: Option<String>,
    generation: u64,
}

#[derive(Debug, Clone)]
/// View-model списка постов: пагинация, поиск, защита от устаревших ответов.
///
/// Структура не делает I/O. Каждая операция навигации возвращает
/// [`FeedQuery`] с номером поколения; ответ на запрос из устаревшего
/// поколения игнорируется, так что при быстрой смене страницы или
/// поискового запроса выигрывает последний запрошенный, а не последний
/// пришедший ответ.
pub struct PostFeed {
    items: Vec<Post>,
    total: u64,
    page: u32,
    pages: u32,
    limit: u32,
    search: Option<String>,
    loading: bool,
    error: Option<String>,
    generation: u64,
    last_query: Option<FeedQuery>,
}

impl PostFeed {
    /// Создаёт пустой feed с заданным размером страницы (минимум 1).
    pub fn new(limit: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            pages: 1,
            limit: limit.max(1),
            search: None,
            loading: false,
            error: None,
            generation: 0,
            last_query: None,
        }
    }

    fn issue(&mut self, page: u32, search: Option<String>) -> FeedQuery {
        self.generation += 1;
        self.loading = true;
        self.error = None;

        let query = FeedQuery {
            page: page.max(1),
            limit: self.limit,
            search,
            generation: self.generation,
        };
        self.last_query = Some(query.clone());
        query
    }

    /// Запрашивает текущую страницу заново (первая загрузка и refresh).
    pub fn refresh(&mut self) -> FeedQuery {
        let search = self.search.clone();
        self.issue(self.page, search)
    }

    /// Переходит на конкретную страницу.
    pub fn open_page(&mut self, page: u32) -> FeedQuery {
        let search = self.search.clone();
        self.issue(page, search)
    }

    /// Меняет поисковую строку и сбрасывает пагинацию на первую страницу.
    ///
    /// Пустая после trim строка означает отсутствие поиска.
    pub fn set_search(&mut self, term: Option<String>) -> FeedQuery {
        let term = term.and_then(|raw| {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() { None } else { Some(trimmed) }
        });
        self.search = term.clone();
        self.issue(1, term)
    }

    /// Следующая страница; `None` на последней.
    pub fn next_page(&mut self) -> Option<FeedQuery> {
        if !self.can_go_next() {
            return None;
        }
        Some(self.open_page(self.page + 1))
    }

    /// Предыдущая страница; `None` на первой.
    pub fn prev_page(&mut self) -> Option<FeedQuery> {
        if !self.can_go_prev() {
            return None;
        }
        Some(self.open_page(self.page - 1))
    }

    /// Повторяет последний выданный запрос с теми же параметрами.
    pub fn retry(&mut self) -> FeedQuery {
        match self.last_query.clone() {
            Some(query) => self.issue(query.page, query.search),
            None => self.refresh(),
        }
    }

    /// Принимает результат выполнения `query`.
    ///
    /// Возвращает `false`, если запрос устарел (с тех пор выдан более
    /// новый) — такой ответ полностью игнорируется. Успешный ответ
    /// заменяет список целиком, а `page`/`pages`/`total` берутся из
    /// ответа сервера, а не из запрошенных значений. Ошибка оставляет
    /// прежние элементы на месте и выставляет только флаг ошибки.
    pub fn apply(&mut self, query: &FeedQuery, result: Result<PostPage, String>) -> bool {
        if query.generation != self.generation {
            return false;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.items = page.items;
                self.total = page.total;
                self.page = page.page.max(1);
                self.pages = page.pages;
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
        true
    }

    /// Доступен ли переход назад (false на первой странице).
    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    /// Доступен ли переход вперёд (false на последней странице).
    pub fn can_go_next(&self) -> bool {
        self.page < self.pages
    }

    /// Посты текущей страницы.
    pub fn items(&self) -> &[Post] {
        &self.items
    }

    /// Номер текущей страницы.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Общее количество страниц по данным сервера.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Общее количество постов по данным сервера.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Размер страницы.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Текущая поисковая строка.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Идёт ли загрузка.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Текст последней ошибки загрузки.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
