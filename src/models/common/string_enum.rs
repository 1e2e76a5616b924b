//! 以字符串形式存库和序列化的枚举
//!
//! 数据库中的枚举列统一使用小写字符串，宏生成 `as_str`、`Display`、
//! `FromStr` 以及 serde 实现。`|` 之后的字面量是兼容旧数据的别名，
//! 只参与解析。

macro_rules! define_string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $value:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value $(| $alias)* => Ok($name::$variant),)+
                    _ => Err(format!(
                        "Invalid {}: '{}'. Expected one of: {}",
                        stringify!($name),
                        s,
                        [$($value),+].join(", ")
                    )),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use define_string_enum;

#[cfg(test)]
mod tests {
    define_string_enum! {
        enum Light {
            Red => "red" | "merah",
            Green => "green",
        }
    }

    #[test]
    fn test_parse_with_alias() {
        assert_eq!("red".parse::<Light>(), Ok(Light::Red));
        assert_eq!("merah".parse::<Light>(), Ok(Light::Red));
        assert_eq!(Light::Red.to_string(), "red");
    }

    #[test]
    fn test_parse_error_lists_values() {
        let err = "blue".parse::<Light>().unwrap_err();
        assert!(err.contains("red, green"));
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Light::Green).unwrap();
        assert_eq!(json, "\"green\"");
        let parsed: Light = serde_json::from_str("\"merah\"").unwrap();
        assert_eq!(parsed, Light::Red);
        assert!(serde_json::from_str::<Light>("\"blue\"").is_err());
        assert_eq!(Light::ALL.len(), 2);
    }
}
