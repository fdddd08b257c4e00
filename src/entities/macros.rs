//! Macros for reducing boilerplate when defining documents
//!
//! These macros generate the repetitive trait implementations needed
//! for each document type.

/// Implement [`Entity`](crate::core::entity::Entity) for a document struct
///
/// The struct must have `id: Uuid`, `created_at` and `updated_at` fields.
///
/// # Example
///
/// ```rust,ignore
/// impl_document!(Company, "company", "companies", CompanyPatch);
/// ```
#[macro_export]
macro_rules! impl_document {
    ($type:ident, $singular:expr, $plural:expr, $patch:ty) => {
        impl $crate::core::entity::Entity for $type {
            type Patch = $patch;

            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }
        }
    };
}

/// Implement [`Patch`](crate::core::entity::Patch) for a patch record
///
/// Fields listed in the first block overwrite the target field; fields in
/// the `optional` block target `Option<_>` fields and are wrapped in `Some`.
///
/// # Example
///
/// ```rust,ignore
/// impl_patch!(InvoicePatch => Invoice {
///     updated_by,
/// } optional {
///     quantity,
///     discount,
/// });
/// ```
#[macro_export]
macro_rules! impl_patch {
    (
        $patch:ty => $type:ty {
            $( $field:ident ),* $(,)?
        }
        $( optional {
            $( $opt:ident ),* $(,)?
        } )?
    ) => {
        impl $crate::core::entity::Patch<$type> for $patch {
            fn apply_to(self, target: &mut $type) {
                $(
                    if let Some(value) = self.$field {
                        target.$field = value;
                    }
                )*
                $( $(
                    if let Some(value) = self.$opt {
                        target.$opt = Some(value);
                    }
                )* )?
            }

            fn is_empty(&self) -> bool {
                true $( && self.$field.is_none() )* $( $( && self.$opt.is_none() )* )?
            }
        }
    };
}
