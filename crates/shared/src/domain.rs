use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

macro_rules! key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

key_newtype!(ItemId);
key_newtype!(CategoryKey);

/// One image entry of a category list, as delivered by the gallery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: ItemId,
    pub image_url: String,
    pub title: String,
}

impl GalleryItem {
    pub fn new(id: impl Into<String>, image_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: ItemId(id.into()),
            image_url: image_url.into(),
            title: title.into(),
        }
    }
}
