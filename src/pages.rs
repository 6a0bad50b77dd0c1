//! View models for the application's screens.
//!
//! These only read from the wrapper layer and the session context; a
//! failed query shows up as an `is_error` flag, never as an error value.

use crate::api::{Api, HOME_CREATORS_LIMIT, INFINITE_POSTS_PAGE_SIZE};
use crate::dto::Screen;
use crate::models::{DocRef, Post, User};
use crate::session::SessionSnapshot;
use serde::Serialize;

pub const PROFILE_PLACEHOLDER: &str = "/assets/icons/profile-placeholder.svg";

/// (label, screen, icon)
const SIDEBAR_LINKS: [(&str, Screen, &str); 5] = [
    ("Home", Screen::Home, "/assets/icons/home.svg"),
    ("Explore", Screen::Explore, "/assets/icons/wallpaper.svg"),
    ("People", Screen::AllUsers, "/assets/icons/people.svg"),
    ("Saved", Screen::Saved, "/assets/icons/bookmark.svg"),
    ("Create Post", Screen::CreatePost, "/assets/icons/gallery-add.svg"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub route: String,
    pub img_url: &'static str,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileBadge {
    pub link: Screen,
    pub name: String,
    pub username: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeftSidebar {
    /// `None` while loading or when nobody is signed in; a loader is shown
    pub profile: Option<ProfileBadge>,
    pub links: Vec<NavLink>,
}

impl LeftSidebar {
    pub fn build(session: &SessionSnapshot, pathname: &str) -> Self {
        let profile = (!session.is_loading && !session.user.email.is_empty()).then(|| {
            let user = &session.user;
            ProfileBadge {
                link: Screen::Profile(user.id.clone()),
                name: user.name.clone(),
                username: format!("@{}", user.username),
                image_url: if user.image_url.is_empty() {
                    PROFILE_PLACEHOLDER.to_string()
                } else {
                    user.image_url.clone()
                },
            }
        });

        let links = SIDEBAR_LINKS
            .iter()
            .map(|(label, screen, img_url)| {
                let route = screen.path();
                NavLink {
                    label: *label,
                    is_active: route == pathname,
                    route,
                    img_url: *img_url,
                }
            })
            .collect();

        Self { profile, links }
    }
}

/// New like list after the current user toggles their like.
pub fn toggle_like(likes: &[String], user_id: &str) -> Vec<String> {
    if likes.iter().any(|id| id == user_id) {
        likes.iter().filter(|id| *id != user_id).cloned().collect()
    } else {
        let mut likes = likes.to_vec();
        likes.push(user_id.to_string());
        likes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCard {
    pub post: Post,
    pub like_count: usize,
    pub liked: bool,
}

impl PostCard {
    pub fn new(post: Post, viewer: &User) -> Self {
        let likes = post.like_ids();
        Self {
            like_count: likes.len(),
            liked: !viewer.id.is_empty() && likes.contains(&viewer.id),
            post,
        }
    }
}

fn cards(posts: Vec<Post>, viewer: &User) -> Vec<PostCard> {
    posts
        .into_iter()
        .map(|post| PostCard::new(post, viewer))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomePage {
    pub posts: Vec<PostCard>,
    pub creators: Vec<User>,
    pub is_error_posts: bool,
    pub is_error_creators: bool,
}

impl HomePage {
    pub async fn load(api: &Api, viewer: &User) -> Self {
        let (posts, creators) = tokio::join!(
            api.get_recent_posts(),
            api.get_users(Some(HOME_CREATORS_LIMIT))
        );

        Self {
            is_error_posts: posts.is_none(),
            is_error_creators: creators.is_none(),
            posts: cards(posts.map(|list| list.documents).unwrap_or_default(), viewer),
            creators: creators.map(|list| list.documents).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorePage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    pub posts: Vec<PostCard>,
    /// Cursor for the next feed page; set only after a full feed page
    pub next_cursor: Option<String>,
    pub is_error: bool,
}

impl ExplorePage {
    pub async fn load(
        api: &Api,
        viewer: &User,
        search_term: Option<&str>,
        cursor: Option<&str>,
    ) -> Self {
        let search_term = search_term.filter(|term| !term.is_empty());

        let result = match search_term {
            Some(term) => api.search_posts(term).await,
            None => api.get_infinite_posts(cursor).await,
        };
        let is_error = result.is_none();
        let posts = result.map(|list| list.documents).unwrap_or_default();

        let next_cursor = match search_term {
            Some(_) => None,
            None if posts.len() == INFINITE_POSTS_PAGE_SIZE => {
                posts.last().map(|post| post.id.clone())
            }
            None => None,
        };

        Self {
            search_term: search_term.map(str::to_string),
            posts: cards(posts, viewer),
            next_cursor,
            is_error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllUsersPage {
    pub users: Vec<User>,
    pub is_error: bool,
}

impl AllUsersPage {
    pub async fn load(api: &Api) -> Self {
        let users = api.get_users(None).await;
        Self {
            is_error: users.is_none(),
            users: users.map(|list| list.documents).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilePage {
    pub user: User,
    pub posts: Vec<PostCard>,
    pub is_current_user: bool,
}

impl ProfilePage {
    /// `None` when the profile document cannot be fetched.
    pub async fn load(api: &Api, viewer: &User, user_id: &str) -> Option<Self> {
        let user = api.get_user_by_id(user_id).await?;
        let posts = api
            .get_user_posts(Some(&user.id))
            .await
            .map(|list| list.documents)
            .unwrap_or_default();

        Some(Self {
            is_current_user: !viewer.id.is_empty() && viewer.id == user.id,
            posts: cards(posts, viewer),
            user,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedEntry {
    pub save_id: String,
    pub post: PostCard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedPage {
    pub saved: Vec<SavedEntry>,
    pub is_error: bool,
}

impl SavedPage {
    pub async fn load(api: &Api, viewer: &User) -> Self {
        let Some(saves) = api.get_saved_posts(&viewer.id).await else {
            return Self {
                saved: Vec::new(),
                is_error: true,
            };
        };

        let mut saved = Vec::with_capacity(saves.documents.len());
        for save in saves.documents {
            let post = match save.post {
                DocRef::Document(post) => Some(*post),
                // Relationship not expanded; fetch it. Deleted posts drop out.
                DocRef::Id(id) => api.get_post_by_id(&id).await,
            };
            if let Some(post) = post {
                saved.push(SavedEntry {
                    save_id: save.id,
                    post: PostCard::new(post, viewer),
                });
            }
        }

        Self {
            saved,
            is_error: false,
        }
    }
}
