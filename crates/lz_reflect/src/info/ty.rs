use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

/// The identity of a concrete type: its [`TypeId`] and full path.
///
/// Equality and hashing only consider the [`TypeId`].
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    path: &'static str,
}

impl Type {
    /// Returns the [`Type`] of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lz_reflect::info::Type;
    ///
    /// let ty = Type::of::<Vec<u32>>();
    /// assert_eq!(ty.name(), "Vec");
    /// assert!(ty.is::<Vec<u32>>());
    /// ```
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`].
    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type path, generics included.
    #[inline(always)]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the last path segment without generics.
    pub fn name(&self) -> &'static str {
        let base = match self.path.find('<') {
            Some(index) => &self.path[..index],
            None => self.path,
        };
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Returns `true` if this is the type `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}
