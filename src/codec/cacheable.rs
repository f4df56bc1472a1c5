//! Type tags for values that may be cached.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

// == Cacheable ==
/// A value the codec can store and later rebuild as the same type.
///
/// The tag is written next to the payload and compared on decode, so two
/// types must never share one. Application types use [`impl_cacheable!`]:
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct AccountBalance {
///     account: String,
///     amount: f64,
/// }
///
/// nscache::impl_cacheable!(AccountBalance => "bank.AccountBalance");
/// ```
///
/// [`impl_cacheable!`]: crate::impl_cacheable
pub trait Cacheable: Serialize + DeserializeOwned {
    fn type_tag() -> Cow<'static, str>;
}

/// Implements [`Cacheable`](crate::codec::Cacheable) with a fixed type tag.
#[macro_export]
macro_rules! impl_cacheable {
    ($($ty:ty => $tag:expr),+ $(,)?) => {
        $(
            impl $crate::codec::Cacheable for $ty {
                fn type_tag() -> ::std::borrow::Cow<'static, str> {
                    ::std::borrow::Cow::Borrowed($tag)
                }
            }
        )+
    };
}

impl_cacheable!(
    bool => "bool",
    i32 => "i32",
    i64 => "i64",
    u32 => "u32",
    u64 => "u64",
    f64 => "f64",
    String => "string",
    NaiveDate => "date",
    DateTime<Utc> => "datetime",
    DateTime<FixedOffset> => "datetime-offset",
);

impl<T: Cacheable> Cacheable for Vec<T> {
    fn type_tag() -> Cow<'static, str> {
        Cow::Owned(format!("list<{}>", T::type_tag()))
    }
}

impl<T: Cacheable> Cacheable for BTreeMap<String, T> {
    fn type_tag() -> Cow<'static, str> {
        Cow::Owned(format!("map<{}>", T::type_tag()))
    }
}

impl<T: Cacheable> Cacheable for HashMap<String, T> {
    fn type_tag() -> Cow<'static, str> {
        Cow::Owned(format!("map<{}>", T::type_tag()))
    }
}
