use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result, anyhow};
use blogi_client::{BlogiClient, ClientError, ImageUpload, Post, PostDraft, PostPatch, User};
use blogi_core::{NoticeKind, Notifier, TokenClaims};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

const TOKEN_FILE: &str = ".blogi_token";
const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

#[derive(Debug, Parser)]
#[command(name = "blogi-cli", version, about = "CLI клиент для Blogi")]
struct Cli {
    /// Адрес сервера (по умолчанию http://127.0.0.1:8000 или $BLOGI_SERVER).
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя (после успеха сразу выполняется вход).
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: удаляет сохранённый токен.
    Logout,
    /// Список постов с пагинацией и поиском.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста (требует токен).
    ///
    /// Если указан `--image`, файл сначала загружается через presigned
    /// URL, и только потом создаётся пост.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Путь к файлу обложки.
        #[arg(long)]
        image: Option<String>,
    },
    /// Обновление поста (требует токен). Неуказанные поля не меняются.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Путь к новому файлу обложки.
        #[arg(long)]
        image: Option<String>,
    },
    /// Удаление поста (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Посты текущего пользователя.
    Mine,
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Error => eprintln!("Ошибка: {message}"),
            NoticeKind::Success | NoticeKind::Info => println!("{message}"),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Логи не должны ломать вывод команд, ошибки инициализации глотаем.
    let _ = fmt().with_env_filter(filter).with_target(true).compact().try_init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    let notifier = ConsoleNotifier;
    if let Err(err) = run(&notifier).await {
        notifier.notify(NoticeKind::Error, &format!("{err}"));
        process::exit(1);
    }
}

async fn run(notifier: &dyn Notifier) -> Result<()> {
    let cli = Cli::parse();

    let server = resolve_server(cli.server);
    let mut client = BlogiClient::new(server);

    if let Some(token) = load_token().context("не удалось прочитать .blogi_token")? {
        client.set_token(token);
    }

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let user = client
                .register(&username, &email, &password)
                .await
                .map_err(map_client_error)?;
            client
                .login(&username, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            notifier.notify(NoticeKind::Success, "Регистрация успешна");
            print_user(&user);
        }
        Command::Login { username, password } => {
            client
                .login(&username, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            let session = client.session().map_err(map_client_error)?;
            notifier.notify(
                NoticeKind::Success,
                &format!("Вход выполнен: {} (id={})", session.username, session.user_id),
            );
        }
        Command::Logout => {
            clear_token().context("не удалось удалить токен")?;
            notifier.notify(NoticeKind::Success, "Токен удалён");
        }
        Command::List {
            page,
            limit,
            search,
        } => {
            let result = client
                .list_posts(page.max(1), limit, search.as_deref())
                .await
                .map_err(map_client_error)?;
            print_page(&result, search.as_deref());
        }
        Command::Get { id } => {
            let post = client.get_post(id).await.map_err(map_client_error)?;
            print_post("Пост", &post);
        }
        Command::Create {
            title,
            content,
            image,
        } => {
            let draft = PostDraft {
                title,
                content,
                image_url: None,
            };
            let image = image.map(|path| read_image(&path)).transpose()?;
            let post = client
                .publish_post(&draft, image)
                .await
                .map_err(map_client_error)?;
            notifier.notify(NoticeKind::Success, "Пост создан");
            print_post("Пост", &post);
        }
        Command::Update {
            id,
            title,
            content,
            image,
        } => {
            let patch = PostPatch {
                title,
                image_url: None,
                content,
            };
            let image = image.map(|path| read_image(&path)).transpose()?;
            if patch.is_empty() && image.is_none() {
                return Err(anyhow!(
                    "нечего обновлять: укажите --title, --content или --image"
                ));
            }

            let post = client
                .revise_post(id, patch, image)
                .await
                .map_err(map_client_error)?;
            notifier.notify(NoticeKind::Success, "Пост обновлён");
            print_post("Пост", &post);
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            notifier.notify(NoticeKind::Success, &format!("Пост удалён: id={id}"));
        }
        Command::Mine => {
            let posts = client.my_posts().await.map_err(map_client_error)?;
            println!("Ваших постов: {}", posts.len());
            for post in &posts {
                println!("- [{}] {} (обновлён {})", post.id, post.title, post.updated_at);
            }
        }
    }

    Ok(())
}

fn resolve_server(server: Option<String>) -> String {
    let raw = server
        .or_else(|| std::env::var("BLOGI_SERVER").ok())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

/// MIME-тип обложки по расширению файла.
///
/// Бэкенд принимает только jpeg/jpg/png/gif.
fn image_mime_type(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" => Some("image/jpg"),
        "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

fn read_image(path: &str) -> Result<ImageUpload> {
    let file_type = image_mime_type(path).ok_or_else(|| {
        anyhow!("неподдерживаемый тип файла: {path} (ожидается jpg/jpeg/png/gif)")
    })?;
    let file_name = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("некорректный путь к файлу: {path}"))?
        .to_string();
    let bytes = fs::read(path).with_context(|| format!("не удалось прочитать файл {path}"))?;

    Ok(ImageUpload {
        file_name,
        file_type: file_type.to_string(),
        bytes,
    })
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    let Some(token) = parse_token_content(&raw) else {
        return Ok(None);
    };

    // Просроченный токен бесполезен: игнорируем его, чтобы команда
    // упала с понятным "требуется авторизация", а не с 401 от сервера.
    if let Ok(claims) = TokenClaims::parse(&token) {
        if claims.is_expired(chrono::Utc::now().timestamp()) {
            tracing::warn!("сохранённый токен истёк, потребуется повторный вход");
            return Ok(None);
        }
    }

    Ok(Some(token))
}

fn persist_token(client: &BlogiClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn clear_token() -> io::Result<()> {
    if Path::new(TOKEN_FILE).exists() {
        fs::remove_file(TOKEN_FILE)?;
    }
    Ok(())
}

fn map_client_error(err: ClientError) -> anyhow::Error {
    let message = match err {
        ClientError::Unauthorized => {
            "требуется авторизация: выполните `blogi-cli login ...` или `blogi-cli register ...`"
                .to_string()
        }
        ClientError::NotFound => "ресурс не найден".to_string(),
        ClientError::Api { status, message } => {
            format!("ошибка API (статус {status}): {message}")
        }
        ClientError::Upload(message) => format!("ошибка загрузки файла: {message}"),
        ClientError::Token(err) => format!("токен не читается: {err}"),
        ClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow!(message)
}

fn print_user(user: &User) {
    println!("user:");
    println!("  id: {}", user.id);
    println!("  username: {}", user.username);
    println!("  email: {}", user.email);
    println!("  created_at: {}", user.created_at);
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("content: {}", post.content);
    if let Some(image_url) = &post.image_url {
        println!("image_url: {image_url}");
    }
    println!("author: {} (id={})", post.author_username, post.user_id);
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
}

fn print_page(page: &blogi_client::PostPage, search: Option<&str>) {
    match search {
        Some(term) => println!(
            "Страница {} из {} по запросу «{}» (всего {})",
            page.page, page.pages, term, page.total
        ),
        None => println!("Страница {} из {} (всего {})", page.page, page.pages, page.total),
    }

    for post in &page.items {
        println!("- [{}] {} (автор: {})", post.id, post.title, post.author_username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://example.com:8000".to_string());
        assert_eq!(s, "https://example.com:8000");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:8000".to_string());
        assert_eq!(s, "http://127.0.0.1:8000");
    }

    #[test]
    fn parse_token_content_trims_whitespace() {
        let token = parse_token_content("  abc.def.ghi  ");
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn parse_token_content_rejects_blank() {
        let token = parse_token_content("   ");
        assert!(token.is_none());
    }

    #[test]
    fn image_mime_type_accepts_supported_extensions() {
        assert_eq!(image_mime_type("cover.jpg"), Some("image/jpg"));
        assert_eq!(image_mime_type("photos/cover.JPEG"), Some("image/jpeg"));
        assert_eq!(image_mime_type("cover.png"), Some("image/png"));
        assert_eq!(image_mime_type("cover.gif"), Some("image/gif"));
    }

    #[test]
    fn image_mime_type_rejects_everything_else() {
        assert!(image_mime_type("cover.webp").is_none());
        assert!(image_mime_type("cover").is_none());
        assert!(image_mime_type("archive.tar.bz2").is_none());
    }
}
