use serde::Serialize;

// 统一API响应结构
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

#[derive(Serialize, Debug)]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub code: String,
    pub message: String,
}

// 便捷构造函数
impl<T> ApiResponse<T> {
    pub fn success(data: T, message: &str) -> Self {
        Self {
            success: true,
            code: 200,
            message: message.to_string(),
            data: Some(data),
            meta: None,
            errors: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn success_with_meta(data: T, message: &str, meta: ResponseMeta) -> Self {
        Self {
            meta: Some(meta),
            ..Self::success(data, message)
        }
    }

    pub fn created(data: T, message: &str) -> Self {
        Self {
            code: 201,
            ..Self::success(data, message)
        }
    }

    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            code: 200,
            message: message.to_string(),
            data: None,
            meta: None,
            errors: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// 单条错误的响应，`error_code` 同时写入 errors[0].code
    pub fn error(code: u16, message: &str, error_code: &str) -> Self {
        Self::with_errors(
            code,
            message,
            vec![ErrorDetail {
                field: None,
                code: error_code.to_string(),
                message: message.to_string(),
            }],
        )
    }

    pub fn with_errors(code: u16, message: &str, errors: Vec<ErrorDetail>) -> Self {
        Self {
            success: false,
            code,
            message: message.to_string(),
            data: None,
            meta: None,
            errors: Some(errors),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::error(401, message, "UNAUTHORIZED")
    }

    pub fn not_found(message: &str) -> Self {
        Self::error(404, message, "NOT_FOUND")
    }

    pub fn conflict(message: &str, field: Option<String>, error_code: &str) -> Self {
        Self::with_errors(
            409,
            message,
            vec![ErrorDetail {
                field,
                code: error_code.to_string(),
                message: message.to_string(),
            }],
        )
    }

    pub fn bad_request(message: &str) -> Self {
        Self::error(400, message, "BAD_REQUEST")
    }

    pub fn internal_error(message: &str) -> Self {
        Self::error(500, message, "INTERNAL_ERROR")
    }
}

// 业务错误码常量
pub mod error_codes {
    // 路线图相关
    pub const ROADMAP_NOT_FOUND: &str = "ROADMAP_NOT_FOUND";
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
    pub const PHASE_NOT_FOUND: &str = "PHASE_NOT_FOUND";
    pub const MODULE_NOT_FOUND: &str = "MODULE_NOT_FOUND";
    pub const TASK_NOT_FOUND: &str = "TASK_NOT_FOUND";
    pub const NO_ACTIVE_PHASE: &str = "NO_ACTIVE_PHASE";
    pub const PHASE_NOT_ACTIVE: &str = "PHASE_NOT_ACTIVE";
    pub const PHASE_INCOMPLETE: &str = "PHASE_INCOMPLETE";
    pub const MODULE_INCOMPLETE: &str = "MODULE_INCOMPLETE";
    pub const MODULE_ALREADY_COMPLETED: &str = "MODULE_ALREADY_COMPLETED";

    // 用户相关
    pub const USERNAME_EXISTS: &str = "USERNAME_EXISTS";

    // 反思与技能
    pub const REFLECTION_NOT_FOUND: &str = "REFLECTION_NOT_FOUND";
    pub const SKILL_NOT_FOUND: &str = "SKILL_NOT_FOUND";
    pub const SKILL_MAX_PROFICIENCY: &str = "SKILL_MAX_PROFICIENCY";

    // 系统相关
    pub const SYSTEM_DATABASE_ERROR: &str = "SYSTEM_001";
    pub const SYSTEM_CACHE_ERROR: &str = "SYSTEM_002";
    pub const SYSTEM_EXTERNAL_SERVICE_ERROR: &str = "SYSTEM_003";
}
