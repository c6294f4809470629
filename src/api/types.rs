use serde::{Deserialize, Serialize};

use crate::types::{AccessToken, RefreshToken, User, Versions};

/// Form body of `POST /api/login`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct LoginForm {
    pub(super) grant_type: Option<String>,
    pub(super) username: Option<String>,
    pub(super) password: Option<String>,
    pub(super) refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct InfoResponse {
    api_version: String,
    application_version: String,
    base_url: &'static str,
}

impl From<Versions> for InfoResponse {
    fn from(versions: Versions) -> Self {
        Self {
            api_version: versions.api,
            application_version: versions.app,
            base_url: "api/3",
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct LoginResponse {
    #[serde(rename = "bak:ApiVersion")]
    api_version: String,
    #[serde(rename = "bak:AppVersion")]
    app_version: String,
    token_type: &'static str,
    expires_in: u32,
    scope: &'static str,
    #[serde(rename = "bak:UserId")]
    user_id: &'static str,
    refresh_token: RefreshToken,
    access_token: AccessToken,
}

impl LoginResponse {
    pub(super) fn new(versions: Versions, user: User) -> Self {
        Self {
            api_version: versions.api,
            app_version: versions.app,
            token_type: "Bearer",
            expires_in: 3599,
            scope: "openid profile offline_access bakalari_api",
            user_id: "1",
            refresh_token: user.refresh_token,
            access_token: user.access_token,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct UserResponse {
    #[serde(rename = "UserUID")]
    user_uid: &'static str,
    campaign_category_code: String,
    class: ClassInfo,
    full_name: String,
    school_organization_name: &'static str,
    school_type: Option<&'static str>,
    user_type: &'static str,
    user_type_text: &'static str,
    study_year: u8,
    enabled_modules: Vec<ModuleRights>,
    setting_modules: SettingModules,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ClassInfo {
    id: &'static str,
    abbrev: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ModuleRights {
    module: &'static str,
    rights: &'static [&'static str],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SettingModules {
    common: CommonSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CommonSettings {
    #[serde(rename = "$type")]
    kind: &'static str,
    actual_semester: Semester,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Semester {
    semester_id: &'static str,
    from: &'static str,
    to: &'static str,
}

/// Modules advertised as enabled. `Campaign` is left out so clients show no ads.
const ENABLED_MODULES: &[(&str, &[&str])] = &[
    (
        "Komens",
        &[
            "ShowReceivedMessages",
            "ShowSentMessages",
            "ShowNoticeBoardMessages",
            "SendMessages",
            "ShowRatingDetails",
            "SendAttachments",
        ],
    ),
    ("Absence", &["ShowAbsence", "ShowAbsencePercentage"]),
    ("Events", &["ShowEvents"]),
    ("Marks", &["ShowMarks", "ShowFinalMarks", "PredictMarks"]),
    ("Timetable", &["ShowTimetable"]),
    ("Substitutions", &["ShowSubstitutions"]),
    ("Subjects", &["ShowSubjects", "ShowSubjectThemes"]),
    ("Homeworks", &["ShowHomeworks"]),
    (
        "Gdpr",
        &["ShowOwnConsents", "ShowChildConsents", "ShowCommissioners"],
    ),
];

impl UserResponse {
    pub(super) fn new(user: &User, campaign_category_code: String) -> Self {
        Self {
            user_uid: "1234/the_id",
            campaign_category_code,
            class: ClassInfo {
                id: "XL",
                abbrev: user.class_name.clone(),
                name: user.class_name.clone(),
            },
            full_name: format!("{}, {}", user.name, user.class_name),
            school_organization_name: "škola",
            school_type: None,
            user_type: "student",
            user_type_text: "student",
            study_year: 1,
            enabled_modules: ENABLED_MODULES
                .iter()
                .map(|&(module, rights)| ModuleRights { module, rights })
                .collect(),
            setting_modules: SettingModules {
                common: CommonSettings {
                    kind: "CommonModuleSettings",
                    // Clients never validate the semester range.
                    actual_semester: Semester {
                        semester_id: "1",
                        from: "2020-09-04T00:00:00+01:00",
                        to: "2021-02-14T23:59:59+02:00",
                    },
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct WebModuleResponse {
    web_modules: Vec<WebModule>,
    dashboard: WebModule,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct WebModule {
    icon_id: Option<&'static str>,
    sub_menu: Option<Vec<WebModule>>,
    url: &'static str,
    name: Option<&'static str>,
}

impl Default for WebModuleResponse {
    fn default() -> Self {
        Self {
            web_modules: vec![WebModule {
                icon_id: Some("dokumenty"),
                sub_menu: None,
                url: "",
                name: Some("Dokumenty"),
            }],
            dashboard: WebModule {
                icon_id: None,
                sub_menu: None,
                url: "",
                name: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_login_response_keys() {
        let user = User::new("novak", "4.A");
        let value =
            serde_json::to_value(LoginResponse::new(Versions::new("3.23.0", "1.52"), user.clone()))
                .unwrap();

        assert_eq!(value["bak:ApiVersion"], "3.23.0");
        assert_eq!(value["bak:AppVersion"], "1.52");
        assert_eq!(value["bak:UserId"], "1");
        assert_eq!(value["token_type"], "Bearer");
        assert_eq!(value["expires_in"], 3599);
        assert_eq!(value["access_token"], user.access_token.as_str());
        assert_eq!(value["refresh_token"], user.refresh_token.as_str());
    }

    #[test]
    fn test_user_response_shape() {
        let user = User::new("novak", "4.A");
        let value = serde_json::to_value(UserResponse::new(&user, "code".into())).unwrap();

        assert_eq!(value["UserUID"], "1234/the_id");
        assert_eq!(value["FullName"], "novak, 4.A");
        assert_eq!(value["Class"], json!({"Id": "XL", "Abbrev": "4.A", "Name": "4.A"}));
        assert_eq!(value["SchoolType"], serde_json::Value::Null);
        assert_eq!(
            value["SettingModules"]["Common"]["$type"],
            "CommonModuleSettings"
        );

        let modules: Vec<&str> = value["EnabledModules"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["Module"].as_str().unwrap())
            .collect();
        assert!(modules.contains(&"Marks"));
        assert!(!modules.contains(&"Campaign"));
    }

    #[test]
    fn test_web_module_response_shape() {
        let value = serde_json::to_value(WebModuleResponse::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "WebModules": [
                    {"IconId": "dokumenty", "SubMenu": null, "Url": "", "Name": "Dokumenty"}
                ],
                "Dashboard": {"IconId": null, "SubMenu": null, "Url": "", "Name": null}
            })
        );
    }
}
