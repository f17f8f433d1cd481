use chrono::Local;
use colored::Colorize;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::convert::Infallible;
use std::error::Error;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use warp::Filter;
use warp::http::{Response, StatusCode};
use warp::path::FullPath;

pub const PUBLIC_DIR: &str = "public";

lazy_static! {
    static ref CONTENT_TYPES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("css", "text/css");
        m.insert("js", "text/javascript");
        m.insert("json", "application/json");
        m
    };
}

const PLACEHOLDER_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Site starting up</title>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; text-align: center; padding: 50px; }
        .container { max-width: 600px; margin: 0 auto; }
        h1 { color: #333; }
        p { color: #666; line-height: 1.6; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Welcome to your site</h1>
        <p>The site engine is still initializing, check back in a moment...</p>
        <p>If this page does not go away, check the engine configuration.</p>
    </div>
</body>
</html>
"#;

/// Last-resort server used when the engine cannot be loaded: serve whatever
/// was generated earlier, or a placeholder page if nothing was. The choice
/// is made once, before binding.
pub async fn serve(root: &Path, port: u16) -> Result<(), Box<dyn Error>> {
    let public = root.join(PUBLIC_DIR);
    if public.is_dir() {
        serve_static(public, port).await
    } else {
        serve_placeholder(port).await
    }
}

async fn serve_static(public: PathBuf, port: u16) -> Result<(), Box<dyn Error>> {
    let file_count = WalkDir::new(&public)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count();
    println!(
        "Serving {} generated files from {}",
        file_count,
        public.display()
    );
    println!(
        "{}",
        format!("Static file server running on http://0.0.0.0:{}", port).on_blue()
    );

    warp::serve(site_routes(public).with(access_log()))
        .run((Ipv4Addr::UNSPECIFIED, port))
        .await;
    Ok(())
}

async fn serve_placeholder(port: u16) -> Result<(), Box<dyn Error>> {
    println!(
        "No {} directory found, serving the placeholder page.",
        PUBLIC_DIR
    );
    println!(
        "{}",
        format!("Welcome server running on http://0.0.0.0:{}", port).on_blue()
    );

    warp::serve(placeholder_routes().with(access_log()))
        .run((Ipv4Addr::UNSPECIFIED, port))
        .await;
    Ok(())
}

pub fn site_routes(
    public: PathBuf,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    warp::any()
        .and(warp::path::full())
        .then(move |path: FullPath| {
            let public = public.clone();
            async move { read_site_file(&public, path.as_str()).await }
        })
}

pub fn placeholder_routes() -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    warp::any().map(|| warp::reply::html(PLACEHOLDER_PAGE))
}

async fn read_site_file(public: &Path, request_path: &str) -> Response<Vec<u8>> {
    let target = resolve(public, request_path);
    match tokio::fs::read(&target).await {
        Ok(bytes) => Response::builder()
            .header("Content-Type", content_type(&target))
            .body(bytes)
            .unwrap(),
        Err(_) => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(b"404 Not Found".to_vec())
            .unwrap(),
    }
}

fn resolve(public: &Path, request_path: &str) -> PathBuf {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.is_empty() {
        public.join("index.html")
    } else {
        public.join(trimmed)
    }
}

fn content_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| CONTENT_TYPES.get(ext).copied())
        .unwrap_or("text/html")
}

fn access_log() -> warp::log::Log<impl Fn(warp::log::Info<'_>) + Copy> {
    warp::log::custom(|info| {
        let status = info.status();
        let label = if status.is_success() {
            status.as_u16().to_string().green()
        } else {
            status.as_u16().to_string().red()
        };
        println!(
            "[{}] {} {} {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            info.method(),
            info.path(),
            label
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_site(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "kidou-fallback-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn bare_root_resolves_to_the_index_file() {
        assert_eq!(
            resolve(Path::new("public"), "/"),
            Path::new("public/index.html")
        );
    }

    #[test]
    fn request_paths_resolve_under_the_output_directory() {
        assert_eq!(
            resolve(Path::new("public"), "/css/site.css"),
            Path::new("public/css/site.css")
        );
    }

    #[test]
    fn known_extensions_map_to_their_content_types() {
        assert_eq!(content_type(Path::new("style.css")), "text/css");
        assert_eq!(content_type(Path::new("app.js")), "text/javascript");
        assert_eq!(content_type(Path::new("data.json")), "application/json");
    }

    #[test]
    fn unknown_and_missing_extensions_default_to_html() {
        assert_eq!(content_type(Path::new("about.html")), "text/html");
        assert_eq!(content_type(Path::new("archive.gz")), "text/html");
        assert_eq!(content_type(Path::new("README")), "text/html");
    }

    #[tokio::test]
    async fn existing_files_are_served_with_their_content_type() {
        let public = temp_site("serve");
        fs::write(public.join("style.css"), "body { margin: 0; }").unwrap();
        let routes = site_routes(public);

        let res = warp::test::request().path("/style.css").reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "text/css");
        assert_eq!(res.body(), "body { margin: 0; }");
    }

    #[tokio::test]
    async fn the_root_path_serves_the_index_file() {
        let public = temp_site("index");
        fs::write(public.join("index.html"), "<h1>home</h1>").unwrap();
        let routes = site_routes(public);

        let res = warp::test::request().path("/").reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "text/html");
        assert_eq!(res.body(), "<h1>home</h1>");
    }

    #[tokio::test]
    async fn missing_files_get_a_plain_404() {
        let public = temp_site("missing");
        let routes = site_routes(public);

        let res = warp::test::request().path("/nope.html").reply(&routes).await;
        assert_eq!(res.status(), 404);
        assert_eq!(res.body(), "404 Not Found");
    }

    #[tokio::test]
    async fn the_placeholder_answers_every_path_and_method() {
        let routes = placeholder_routes();

        let res = warp::test::request()
            .path("/anything/at/all")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 200);
        let body = String::from_utf8_lossy(res.body());
        assert!(body.contains("Welcome to your site"));

        let res = warp::test::request()
            .method("POST")
            .path("/")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 200);
    }
}
