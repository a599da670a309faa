//! Server-rendered HTML for the login and recipe pages.
//!
//! Pages are Leptos views rendered to a string per request. There is no
//! hydration; every interaction is a plain form submit handled by the axum
//! routes.

use leptos::either::EitherOf3;
use leptos::prelude::*;

use crate::services::recipes::Recipe;

const STYLE: &str = r".center{text-align:center}
.centerBlock{display:flex;justify-content:center}
.loginButton{padding:.6em 1.6em;font-size:1.1em}
.alert{margin:1em auto;max-width:32em;padding:.8em;border:1px solid #c33;background:#fee}
.loader{width:48px;height:48px;border:6px solid #ddd;border-top-color:#555;border-radius:50%;animation:spin 1s linear infinite}
@keyframes spin{to{transform:rotate(360deg)}}";

/// Inputs for the login page.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginView<'a> {
    /// Both Google clients initialized.
    pub ready: bool,
    pub logged_in: bool,
    pub path_name: Option<&'a str>,
    pub alert: Option<&'a str>,
}

// =============================================================================
// COMPONENTS
// =============================================================================

#[component]
fn PageShell(title: &'static str, refresh: bool, children: Children) -> impl IntoView {
    view! {
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <title>{title}</title>
                // Poll until the Google clients are up.
                {refresh.then(|| view! { <meta http-equiv="refresh" content="2" /> })}
                <style inner_html=STYLE></style>
            </head>
            <body>
                <nav class="toolbar">
                    <a href="/recipes">"Recipes"</a>
                    " | "
                    <a href="/login">"Login"</a>
                </nav>
                {children()}
            </body>
        </html>
    }
}

/// Loader, Login form or Logout form. An empty `path_name` adds no field.
#[component]
fn LoginControls(ready: bool, logged_in: bool, path_name: String) -> impl IntoView {
    if !ready {
        EitherOf3::A(view! {
            <div class="centerBlock">
                <div class="loader"></div>
            </div>
        })
    } else if logged_in {
        EitherOf3::B(view! {
            <div class="center">
                <form method="post" action="/auth/logout">
                    <button class="loginButton" type="submit">"Logout"</button>
                </form>
            </div>
        })
    } else {
        let hidden = (!path_name.is_empty()).then(|| view! { <input type="hidden" name="pathName" value=path_name /> });
        EitherOf3::C(view! {
            <div class="center">
                <form method="get" action="/auth/google">
                    {hidden}
                    <button class="loginButton" type="submit">"Login"</button>
                </form>
            </div>
        })
    }
}

#[component]
fn RecipeItem(recipe: Recipe) -> impl IntoView {
    view! {
        <li id=format!("recipe-{}", recipe.id)>
            <strong>{recipe.title.unwrap_or_default()}</strong>
            " "
            <em>{recipe.category.unwrap_or_default()}</em>
            " by "
            <span class="contributor">{recipe.contributor.unwrap_or_default()}</span>
        </li>
    }
}

#[component]
fn RecipeList(recipes: Vec<Recipe>) -> impl IntoView {
    if recipes.is_empty() {
        return view! { <p class="center">"No recipes loaded."</p> }.into_any();
    }
    view! {
        <ul class="recipes">
            {recipes.into_iter().map(|recipe| view! { <RecipeItem recipe=recipe /> }).collect_view()}
        </ul>
    }
    .into_any()
}

// =============================================================================
// RENDERING
// =============================================================================

fn render(page: impl IntoView + 'static) -> String {
    let owner = Owner::new();
    let html = owner.with(|| page.into_view().to_html());
    format!("<!DOCTYPE html>{html}")
}

#[must_use]
pub fn login_page(page: &LoginView<'_>) -> String {
    let ready = page.ready;
    let logged_in = page.logged_in;
    let path_name = page.path_name.unwrap_or_default().to_owned();
    let alert = page
        .alert
        .map(str::to_owned)
        .map(|text| view! { <div class="alert" role="alert">{text}</div> });

    render(view! {
        <PageShell title="Login" refresh={!ready}>
            <br />
            <h1 class="center">"Authenticate With Google"</h1>
            {alert}
            <LoginControls ready=ready logged_in=logged_in path_name=path_name />
        </PageShell>
    })
}

#[must_use]
pub fn recipes_page(recipes: &[Recipe], path: Option<&str>) -> String {
    let recipes = recipes.to_vec();
    let heading = path.map(str::to_owned).map(|path| view! { <h2 class="center">{path}</h2> });

    render(view! {
        <PageShell title="Recipes" refresh=false>
            <h1 class="center">"Recipes"</h1>
            {heading}
            <RecipeList recipes=recipes />
        </PageShell>
    })
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
