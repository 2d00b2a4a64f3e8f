//! Scope identities and uniform access to scope objects.

use fpd_openrtb::{App, Content, Data, Site, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Extension key holding free-form first-party data.
pub const DATA_KEY: &str = "data";

/// One of the three descriptive scopes of a bid request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Site,
    App,
    User,
}

impl Scope {
    /// All scopes in processing order.
    pub const ALL: [Scope; 3] = [Scope::Site, Scope::App, Scope::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Site => "site",
            Scope::App => "app",
            Scope::User => "user",
        }
    }

    /// Key under which this scope's structured data segments are stored.
    pub fn data_key(self) -> DataKey {
        match self {
            Scope::Site => DataKey::SiteContentData,
            Scope::App => DataKey::AppContentData,
            Scope::User => DataKey::UserData,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a structured data segment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataKey {
    /// `site.content.data`
    SiteContentData,
    /// `app.content.data`
    AppContentData,
    /// `user.data`
    UserData,
}

impl DataKey {
    pub fn as_str(self) -> &'static str {
        match self {
            DataKey::SiteContentData => "site-content-data",
            DataKey::AppContentData => "app-content-data",
            DataKey::UserData => "user-data",
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            DataKey::SiteContentData => Scope::Site,
            DataKey::AppContentData => Scope::App,
            DataKey::UserData => Scope::User,
        }
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform access to the parts of a scope object that carry first-party data.
pub trait ScopeObject: Clone {
    const SCOPE: Scope;

    fn ext(&self) -> Option<&Value>;

    fn ext_mut(&mut self) -> &mut Option<Value>;

    /// Take the structured data segments, leaving their container in place.
    fn take_data(&mut self) -> Vec<Data>;

    /// Replace the structured data segments, creating the container if needed.
    fn set_data(&mut self, data: Vec<Data>);
}

impl ScopeObject for Site {
    const SCOPE: Scope = Scope::Site;

    fn ext(&self) -> Option<&Value> {
        self.ext.as_ref()
    }

    fn ext_mut(&mut self) -> &mut Option<Value> {
        &mut self.ext
    }

    fn take_data(&mut self) -> Vec<Data> {
        take_content_data(&mut self.content)
    }

    fn set_data(&mut self, data: Vec<Data>) {
        self.content.get_or_insert_with(Content::default).data = data;
    }
}

impl ScopeObject for App {
    const SCOPE: Scope = Scope::App;

    fn ext(&self) -> Option<&Value> {
        self.ext.as_ref()
    }

    fn ext_mut(&mut self) -> &mut Option<Value> {
        &mut self.ext
    }

    fn take_data(&mut self) -> Vec<Data> {
        take_content_data(&mut self.content)
    }

    fn set_data(&mut self, data: Vec<Data>) {
        self.content.get_or_insert_with(Content::default).data = data;
    }
}

impl ScopeObject for User {
    const SCOPE: Scope = Scope::User;

    fn ext(&self) -> Option<&Value> {
        self.ext.as_ref()
    }

    fn ext_mut(&mut self) -> &mut Option<Value> {
        &mut self.ext
    }

    fn take_data(&mut self) -> Vec<Data> {
        std::mem::take(&mut self.data)
    }

    fn set_data(&mut self, data: Vec<Data>) {
        self.data = data;
    }
}

fn take_content_data(content: &mut Option<Content>) -> Vec<Data> {
    content
        .as_mut()
        .map(|content| std::mem::take(&mut content.data))
        .unwrap_or_default()
}
