mod auth;
mod bootstrap;
mod dashboard;
pub mod error;
mod history;
mod request;
mod response;
mod sites;
mod user;
pub mod wrapper;

use std::sync::Arc;

use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::auth::OpenAPIAuth;
use crate::auth::SessionManager;
use crate::history::HistoryService;
use crate::settings::SettingsStore;
use crate::sites::SiteService;
use crate::users::UserService;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::logout,
        bootstrap::bootstrap,
        sites::get_video_sites,
        sites::get_home_sites,
        sites::get_user_sites,
        sites::update_user_site_status,
        sites::update_user_site_home,
        sites::update_user_site_availability,
        sites::update_user_site_order,
        sites::import_user_sites,
        user::get_user_settings,
        user::update_user_settings,
        history::get_search_history,
        history::add_search_history,
        history::delete_search_history,
        history::get_play_history,
        history::add_play_history,
        history::get_play_record,
        history::get_favorites,
        history::get_favorite_status,
        history::toggle_favorite,
        dashboard::get_source_sites,
        dashboard::import_source_sites,
        dashboard::update_source_site_status,
        dashboard::update_source_site_home,
        dashboard::update_source_site_search,
        dashboard::update_source_site_order,
        dashboard::check_source_sites,
        dashboard::get_search_settings,
        dashboard::update_search_settings,
        dashboard::get_site_settings,
        dashboard::save_site_settings,
        dashboard::list_users,
        dashboard::add_user,
        dashboard::ban_user,
        dashboard::delete_user,
        dashboard::update_user,
    ),
    modifiers(&OpenAPIAuth),
    security(
        ("Token" = []),
    )
)]
pub struct ApiDoc;

/// 组装全部路由，服务通过 Extension 注入
pub fn router(
    settings: Arc<SettingsStore>,
    site_service: Arc<SiteService>,
    user_service: Arc<UserService>,
    history_service: Arc<HistoryService>,
    sessions: Arc<SessionManager>,
) -> Router {
    Router::new()
        // 登录
        .route("/api/login", post(auth::login))
        .route("/api/logout", get(auth::logout))
        .route("/api/bootstrap", get(bootstrap::bootstrap))
        // 站点
        .route("/api/video/sites", get(sites::get_video_sites))
        .route("/api/home/sites", get(sites::get_home_sites))
        .route("/api/user/sites", get(sites::get_user_sites))
        .route("/api/user/sites/status", post(sites::update_user_site_status))
        .route("/api/user/sites/home", post(sites::update_user_site_home))
        .route("/api/user/sites/availability", post(sites::update_user_site_availability))
        .route("/api/user/sites/order", post(sites::update_user_site_order))
        .route("/api/user/sites/import", post(sites::import_user_sites))
        // 个人设置
        .route(
            "/api/user/settings",
            get(user::get_user_settings).put(user::update_user_settings),
        )
        // 历史与收藏
        .route(
            "/api/searchhistory",
            get(history::get_search_history)
                .post(history::add_search_history)
                .delete(history::delete_search_history),
        )
        .route(
            "/api/playhistory",
            get(history::get_play_history).post(history::add_play_history),
        )
        .route("/api/playhistory/one", get(history::get_play_record))
        .route("/api/favorites", get(history::get_favorites))
        .route("/api/favorites/status", get(history::get_favorite_status))
        .route("/api/favorites/toggle", post(history::toggle_favorite))
        // 管理后台
        .route("/dashboard/video/source/sites", get(dashboard::get_source_sites))
        .route("/dashboard/video/source/sites/import", post(dashboard::import_source_sites))
        .route("/dashboard/video/source/sites/status", post(dashboard::update_source_site_status))
        .route("/dashboard/video/source/sites/home", post(dashboard::update_source_site_home))
        .route("/dashboard/video/source/sites/search", post(dashboard::update_source_site_search))
        .route("/dashboard/video/source/sites/order", post(dashboard::update_source_site_order))
        .route("/dashboard/video/source/sites/check", post(dashboard::check_source_sites))
        .route(
            "/dashboard/search/settings",
            get(dashboard::get_search_settings).post(dashboard::update_search_settings),
        )
        .route("/dashboard/site/settings", get(dashboard::get_site_settings))
        .route("/dashboard/site/save", post(dashboard::save_site_settings))
        .route("/dashboard/user/list", get(dashboard::list_users))
        .route("/dashboard/user/add", post(dashboard::add_user))
        .route("/dashboard/user/ban", post(dashboard::ban_user))
        .route("/dashboard/user/delete", post(dashboard::delete_user))
        .route("/dashboard/user/update", post(dashboard::update_user))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(Extension(settings))
        .layer(Extension(site_service))
        .layer(Extension(user_service))
        .layer(Extension(history_service))
        .layer(Extension(sessions))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::SESSION_COOKIE;
    use crate::database::setup_memory_database;

    async fn new_app() -> Router {
        let db = Arc::new(setup_memory_database().await);
        let settings = Arc::new(SettingsStore::new(db.clone()));
        let site_service = SiteService::new(db.clone(), settings.clone());
        let user_service = UserService::new(db.clone(), site_service.clone());
        let history_service = HistoryService::new(db.clone());
        let sessions = Arc::new(SessionManager::new(db, false));
        assert!(sessions.ensure_default_admin().await.unwrap());
        router(
            settings,
            Arc::new(site_service),
            Arc::new(user_service),
            Arc::new(history_service),
            sessions,
        )
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// 登录并返回可直接放入请求头的 Cookie
    async fn login(app: &Router, username: &str, password: &str) -> String {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/login",
                None,
                Some(json!({ "username": username, "password": password })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap().to_string();
        assert!(pair.starts_with(&format!("{}=", SESSION_COOKIE)));
        pair
    }

    #[tokio::test]
    async fn test_login_errors_and_unauthorized() {
        let app = new_app().await;

        let (status, body) = send(&app, request("GET", "/api/user/sites", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], json!(false));

        let (status, _) = send(
            &app,
            request("GET", "/api/user/sites", Some("meowfilm_auth=bogus"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            request("POST", "/api/login", None, Some(json!({ "username": "admin", "password": "nope" }))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], json!("用户名或密码错误"));

        let (status, _) = send(
            &app,
            request("POST", "/api/login", None, Some(json!({ "username": " ", "password": "" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_imports_global_sites() {
        let app = new_app().await;
        let admin = login(&app, "admin", "admin").await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/dashboard/video/source/sites/import",
                Some(&admin),
                Some(json!({ "sites": [
                    { "key": "a", "name": "A", "api": "/spider/a/" },
                    { "key": "b", "name": "B", "api": "/spider/baseset/" }
                ] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["refreshed"], json!(true));
        assert_eq!(body["count"], json!(2));

        let (_, body) = send(&app, request("GET", "/dashboard/video/source/sites", Some(&admin), None)).await;
        let sites = body["sites"].as_array().unwrap();
        assert_eq!(sites[0]["key"], json!("a"));
        assert_eq!(sites[0]["home"], json!(true));
        assert_eq!(sites[0]["availability"], json!("unchecked"));
        assert_eq!(sites[0]["search"], json!(true));
        assert_eq!(sites[1]["home"], json!(false));
        assert_eq!(sites[1]["search"], json!(false));

        // 公开目录不带搜索开关
        let (_, body) = send(&app, request("GET", "/api/video/sites", Some(&admin), None)).await;
        assert!(body["sites"][0].get("search").is_none());

        // 未知站点
        let (status, body) = send(
            &app,
            request(
                "POST",
                "/dashboard/video/source/sites/status",
                Some(&admin),
                Some(json!({ "key": "zzz", "enabled": false })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("站点不存在"));

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/dashboard/video/source/sites/check",
                Some(&admin),
                Some(json!({ "results": { "a": "invalid" } })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // 管理员没有个人接口时回退到全局目录，禁用的站点不上首页
        let (_, body) = send(&app, request("GET", "/api/home/sites", Some(&admin), None)).await;
        assert_eq!(body["sites"], json!([]));
        let (_, body) = send(&app, request("GET", "/api/user/sites", Some(&admin), None)).await;
        assert_eq!(body["requiresCatApiBase"], json!(false));
        // 个人视图使用自己的开关，不继承全局禁用
        assert_eq!(body["sites"][0]["enabled"], json!(true));
        assert_eq!(body["sites"][0]["search"], json!(true));
    }

    #[tokio::test]
    async fn test_plain_user_scope_and_permissions() {
        let app = new_app().await;
        let admin = login(&app, "admin", "admin").await;

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/dashboard/user/add",
                Some(&admin),
                Some(json!({ "username": "bob", "password": "pw" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, request("GET", "/dashboard/user/list", Some(&admin), None)).await;
        assert_eq!(body["userCount"], json!(2));
        assert_eq!(body["users"][0]["username"], json!("admin"));

        let bob = login(&app, "bob", "pw").await;
        let (status, _) = send(&app, request("GET", "/dashboard/user/list", Some(&bob), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, body) = send(&app, request("GET", "/api/user/sites", Some(&bob), None)).await;
        assert_eq!(body, json!({ "success": true, "sites": [], "requiresCatApiBase": true }));

        // 没有个人接口时不能导入
        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/user/sites/import",
                Some(&bob),
                Some(json!({ "sites": [{ "key": "p", "api": "/spider/p/" }] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(false));

        let (status, body) = send(
            &app,
            request(
                "PUT",
                "/api/user/settings",
                Some(&bob),
                Some(json!({
                    "catApiBase": "http://cat.local/spider/x/1",
                    "sites": [{ "key": "p", "name": "P", "api": "/spider/p/" }]
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sitesSync"], json!({ "ok": true, "refreshed": true, "count": 1 }));
        assert_eq!(body["settings"]["catApiBase"], json!("http://cat.local/"));

        let (_, body) = send(&app, request("GET", "/api/user/sites", Some(&bob), None)).await;
        assert_eq!(body["requiresCatApiBase"], json!(false));
        assert_eq!(body["sites"][0]["key"], json!("p"));

        // 禁用后会话立即失效
        let (_, body) = send(
            &app,
            request("POST", "/dashboard/user/ban", Some(&admin), Some(json!({ "username": "bob" }))),
        )
        .await;
        assert_eq!(body["status"], json!("banned"));
        let (status, _) = send(&app, request("GET", "/api/user/sites", Some(&bob), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_envelope() {
        let app = new_app().await;
        let admin = login(&app, "admin", "admin").await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/dashboard/video/source/sites/status",
                Some(&admin),
                Some(json!({ "key": 1, "enabled": true })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "message": "参数无效" }));

        // 非 JSON 文本且没有 Content-Type
        let broken = Request::builder()
            .method("POST")
            .uri("/api/login")
            .body(Body::from("username=admin"))
            .unwrap();
        let (status, body) = send(&app, broken).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("参数无效"));

        // 缺少 Content-Type 的合法 JSON 照常处理
        let plain = Request::builder()
            .method("POST")
            .uri("/api/login")
            .body(Body::from(r#"{"username":"admin","password":"admin"}"#))
            .unwrap();
        let (status, body) = send(&app, plain).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], json!("admin"));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let app = new_app().await;
        let admin = login(&app, "admin", "admin").await;

        let response = app
            .clone()
            .oneshot(request("GET", "/api/logout", Some(&admin), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
        assert!(response.headers().get(SET_COOKIE).is_some());

        let (status, _) = send(&app, request("GET", "/api/video/sites", Some(&admin), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_history_and_favorites_are_per_user() {
        let app = new_app().await;
        let admin = login(&app, "admin", "admin").await;
        send(
            &app,
            request(
                "POST",
                "/dashboard/user/add",
                Some(&admin),
                Some(json!({ "username": "bob", "password": "pw" })),
            ),
        )
        .await;
        let bob = login(&app, "bob", "pw").await;

        let (status, body) = send(&app, request("GET", "/api/searchhistory", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], json!(false));

        for keyword in ["  猫  和 老鼠 ", "海贼王", "猫 和 老鼠"] {
            let (status, _) = send(
                &app,
                request("POST", "/api/searchhistory", Some(&bob), Some(json!({ "keyword": keyword }))),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        let (_, body) = send(&app, request("GET", "/api/searchhistory", Some(&bob), None)).await;
        assert_eq!(body, json!(["猫 和 老鼠", "海贼王"]));
        let (status, body) = send(
            &app,
            request("POST", "/api/searchhistory", Some(&bob), Some(json!({ "keyword": 3 }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "message": "搜索关键词不能为空" }));
        let (_, body) = send(&app, request("GET", "/api/searchhistory", Some(&admin), None)).await;
        assert_eq!(body, json!([]));
        let (_, body) = send(
            &app,
            request("DELETE", "/api/searchhistory?keyword=%E6%B5%B7%E8%B4%BC%E7%8E%8B", Some(&bob), None),
        )
        .await;
        assert_eq!(body, json!(["猫 和 老鼠"]));

        let record = json!({
            "siteKey": "a",
            "siteName": "A",
            "spiderApi": "/spider/a/",
            "videoId": "v1",
            "videoTitle": "Tom and Jerry",
            "episodeIndex": 2.6,
            "episodeName": "第3集",
        });
        let (status, body) = send(&app, request("POST", "/api/playhistory", Some(&bob), Some(record))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
        let (status, body) = send(
            &app,
            request("POST", "/api/playhistory", Some(&bob), Some(json!({ "siteKey": "a" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("参数不完整"));

        let (_, body) = send(&app, request("GET", "/api/playhistory?limit=x", Some(&bob), None)).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["contentKey"], json!("tomandjerry"));
        assert_eq!(body[0]["episodeIndex"], json!(2));
        let (_, body) = send(
            &app,
            request("GET", "/api/playhistory/one?siteKey=a&videoId=v1", Some(&bob), None),
        )
        .await;
        assert_eq!(body["episodeName"], json!("第3集"));
        let (_, body) = send(
            &app,
            request("GET", "/api/playhistory/one?siteKey=a&videoId=v1", Some(&admin), None),
        )
        .await;
        assert_eq!(body, Value::Null);
        let (status, _) = send(&app, request("GET", "/api/playhistory/one?siteKey=a", Some(&bob), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let favorite = json!({ "siteKey": "a", "spiderApi": "/spider/a/", "videoId": "v1", "videoTitle": "Tom" });
        let (_, body) = send(
            &app,
            request("POST", "/api/favorites/toggle", Some(&bob), Some(favorite.clone())),
        )
        .await;
        assert_eq!(body, json!({ "success": true, "favorited": true }));
        let (_, body) = send(
            &app,
            request("GET", "/api/favorites/status?siteKey=a&videoId=v1", Some(&bob), None),
        )
        .await;
        assert_eq!(body, json!({ "favorited": true }));
        let (_, body) = send(&app, request("GET", "/api/favorites/status", Some(&bob), None)).await;
        assert_eq!(body, json!({ "favorited": false }));
        let (_, body) = send(&app, request("GET", "/api/favorites", Some(&bob), None)).await;
        assert_eq!(body[0]["videoTitle"], json!("Tom"));
        let (_, body) = send(&app, request("GET", "/api/favorites", Some(&admin), None)).await;
        assert_eq!(body, json!([]));
        let (_, body) = send(&app, request("POST", "/api/favorites/toggle", Some(&bob), Some(favorite))).await;
        assert_eq!(body, json!({ "success": true, "favorited": false }));

        // 删除用户时一并清理其历史与收藏
        let (status, body) = send(
            &app,
            request("POST", "/dashboard/user/delete", Some(&admin), Some(json!({ "username": "bob" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "deleted": {
                    "tokenDeleted": 1,
                    "historyDeleted": 1,
                    "playHistoryDeleted": 1,
                    "favoritesDeleted": 0,
                    "userDeleted": 1,
                }
            })
        );
    }

    #[tokio::test]
    async fn test_bootstrap_by_page() {
        let app = new_app().await;

        let (status, body) = send(&app, request("GET", "/api/bootstrap?page=index", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "authenticated": false, "siteName": "MeowFilm" }));

        let admin = login(&app, "admin", "admin").await;
        let (_, body) = send(&app, request("GET", "/api/bootstrap?page=index", Some(&admin), None)).await;
        assert_eq!(body["authenticated"], json!(true));
        assert_eq!(body["user"], json!({ "username": "admin", "role": "admin" }));
        assert_eq!(body["userCount"], json!(0));
        let settings = &body["settings"];
        assert_eq!(settings["doubanDataProxy"], json!("direct"));
        assert_eq!(settings["doubanImgProxy"], json!("direct-browser"));
        assert_eq!(settings["searchThreadCount"], json!(5));
        assert_eq!(settings["userCatPawOpenApiBase"], json!(""));
        assert_eq!(settings["searchSiteOrder"], json!([]));
        assert_eq!(settings["homeSites"], json!([]));

        let (_, body) = send(&app, request("GET", "/api/bootstrap?page=dashboard", Some(&admin), None)).await;
        assert_eq!(body["settings"], json!({}));
        assert_eq!(body["userCount"], json!(1));
        let (_, body) = send(&app, request("GET", "/api/bootstrap", Some(&admin), None)).await;
        assert_eq!(body["settings"], json!({}));
        assert_eq!(body["userCount"], json!(0));

        // 失效的会话按未登录处理
        let (status, body) = send(
            &app,
            request("GET", "/api/bootstrap?page=index", Some("meowfilm_auth=bogus"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], json!(false));
    }

    #[tokio::test]
    async fn test_site_settings_save() {
        let app = new_app().await;
        let admin = login(&app, "admin", "admin").await;

        let (_, body) = send(&app, request("GET", "/dashboard/site/settings", Some(&admin), None)).await;
        assert_eq!(body["settings"]["siteName"], json!("MeowFilm"));

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/dashboard/site/save",
                Some(&admin),
                Some(json!({
                    "siteName": " 喵影 ",
                    "doubanDataProxy": "custom",
                    "doubanDataCustom": "https://proxy.example/",
                    "doubanImgProxy": "direct",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["settings"],
            json!({
                "siteName": "喵影",
                "doubanDataProxy": "custom",
                "doubanDataCustom": "https://proxy.example/",
                "doubanImgProxy": "direct",
                "doubanImgCustom": "",
            })
        );
        let (_, body) = send(&app, request("GET", "/api/bootstrap", None, None)).await;
        assert_eq!(body["siteName"], json!("喵影"));

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/dashboard/site/save",
                Some(&admin),
                Some(json!({ "siteName": "x", "doubanDataProxy": "direct" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("参数无效"));
    }

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/user/sites"));
        assert!(doc.paths.paths.contains_key("/dashboard/video/source/sites/check"));
        assert!(doc.paths.paths.contains_key("/api/bootstrap"));
        assert!(doc.paths.paths.contains_key("/api/favorites/toggle"));
        assert!(doc.paths.paths.contains_key("/dashboard/site/save"));
    }
}
