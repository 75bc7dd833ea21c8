/// Generates a field-key enum for a hand-written [`Deserialize`] impl.
///
/// The generated enum carries one variant per recognized configuration key,
/// plus the special `__ignore` variant for unrecognized keys. Incoming keys
/// are matched against the variants (and their aliases) with the given
/// equality function, which allows the keys to arrive in any casing
/// convention.
///
/// [`Deserialize`]: serde::de::Deserialize
macro_rules! impl_deserialize_field {
    (
        $enum_name:ident,
        $key_eq_function:path,
        $( $primary:ident $( | $alias:ident )* ),+ $(,)?
    ) => {
        #[allow(non_camel_case_types)]
        enum $enum_name {
            $( $primary, )+
            __ignore,
        }

        impl $enum_name {
            /// Returns a field variant that matches the given user-provided
            /// string value. Applies the custom string matching function
            /// sequentially to all variants until finding a match. Returns the
            /// special `__ignore` variant if no matches are found.
            fn from_str(value: &str) -> Self {
                $(
                    if $key_eq_function(value, stringify!($primary))
                        $( || $key_eq_function(value, stringify!($alias)) )*
                    {
                        return Self::$primary;
                    }
                )+

                Self::__ignore
            }

            /// Simply represents the field variant as a string slice.
            fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$primary => stringify!($primary), )+
                    Self::__ignore => "__ignore",
                }
            }

            /// Polls the `next_value` from the given `MapAccess` reference and
            /// puts it into the given [`Option`]. If the [`Option`] is already
            /// [`Some`], returns an appropriate Serde error (duplicate field).
            fn poll<'de, A, T>(
                &self,
                from: &mut A,
                into: &mut Option<T>,
            ) -> Result<::serde::de::IgnoredAny, A::Error>
            where
                A: ::serde::de::MapAccess<'de>,
                T: ::serde::de::Deserialize<'de>,
            {
                if into.is_some() {
                    return Err(::serde::de::Error::duplicate_field(self.as_str()));
                }
                *into = Some(from.next_value()?);
                Ok(::serde::de::IgnoredAny)
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::de::Deserializer<'de>,
            {
                struct FieldVisitor;

                impl ::serde::de::Visitor<'_> for FieldVisitor {
                    type Value = $enum_name;

                    fn expecting(
                        &self,
                        formatter: &mut core::fmt::Formatter,
                    ) -> core::fmt::Result {
                        formatter.write_str("a configuration key")
                    }

                    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
                    where
                        E: ::serde::de::Error,
                    {
                        Ok(Self::Value::from_str(value))
                    }

                    fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
                    where
                        E: ::serde::de::Error,
                    {
                        Ok(Self::Value::from_str(&value))
                    }
                }

                deserializer.deserialize_identifier(FieldVisitor)
            }
        }
    };
}

pub(crate) use impl_deserialize_field;
