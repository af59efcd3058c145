//! Field catalog of the childcare workforce survey
//!
//! Literal field definitions for every step. The registry assembles these
//! into steps; nothing here is mutated after construction.

use crate::core::role::Role;
use crate::schema::field::{
    options, ChoiceOption, FieldDescriptor, FieldKind, MatrixColumn, MatrixLayout, TextInputProps,
};
use crate::schema::remote::RemoteSearchConfig;

fn yes_no() -> Vec<ChoiceOption> {
    options(&[("是", "yes"), ("否", "no")])
}

fn numeric_input(key: &str, label: &str, suffix: &str, message: &str) -> FieldDescriptor {
    FieldDescriptor::new(
        key,
        label,
        FieldKind::TextInput(TextInputProps::numeric(suffix)),
    )
    .required(message)
}

// ============================================================================
// Step 1 - organization
// ============================================================================

/// 第一部分：机构信息
pub fn organization_fields(search: RemoteSearchConfig) -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new(
            "orgName",
            "机构名称",
            FieldKind::RemoteSearchableChoice(search),
        )
        .with_placeholder("请输入关键字搜索机构")
        .with_span(2)
        .required("请选择所属机构"),
        FieldDescriptor::new("location", "园所/机构所在地", FieldKind::text())
            .with_placeholder("省-市-区")
            .required("请输入所在地"),
        FieldDescriptor::new(
            "orgNature",
            "机构举办主体",
            FieldKind::radio(options(&[
                ("公办", "public"),
                ("民办", "private"),
                ("公办民营/民办公助", "inclusive_private"),
            ])),
        )
        .required("请选择机构性质"),
        FieldDescriptor::new(
            "orgType",
            "机构具体形态",
            FieldKind::dropdown(options(&[
                ("独立托育机构", "独立托育机构"),
                ("社区嵌入式托育", "社区嵌入式托育"),
                ("幼儿园托班", "幼儿园托班"),
                ("用人单位办托", "用人单位办托"),
                ("家庭托育点", "家庭托育点"),
                ("托育综合服务中心", "托育综合服务中心"),
            ])),
        )
        .with_placeholder("请选择机构类型")
        .required("请选择机构类型"),
        FieldDescriptor::new("isPovertyFree", "是否为普惠托育", FieldKind::radio(yes_no()))
            .required("请选择是否为普惠托育"),
        FieldDescriptor::new(
            "serviceMode",
            "机构服务模式",
            FieldKind::MultiChoice {
                options: options(&[
                    ("全日托", "全日托"),
                    ("半日托", "半日托"),
                    ("计时托", "计时托"),
                    ("临时托", "临时托"),
                ]),
            },
        )
        .with_placeholder("请选择机构服务模式")
        .required("请选择机构服务模式"),
        numeric_input("totalSlots", "机构托位总数", "个", "请输入机构托位总数"),
        numeric_input(
            "totalChildren",
            "机构在园婴幼儿总数",
            "人",
            "请输入机构在园婴幼儿总数",
        ),
        numeric_input("totalStaff", "机构员工总人数", "人", "请输入机构员工总人数"),
    ]
}

// ============================================================================
// Step 2 - personal
// ============================================================================

/// 第二部分：个人信息
pub fn personal_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new(
            "gender",
            "性别",
            FieldKind::radio(options(&[("男", "male"), ("女", "female")])),
        )
        .required("请选择性别"),
        FieldDescriptor::new(
            "education",
            "最高学历",
            FieldKind::dropdown(options(&[
                ("高中/中职", "senior_high_school"),
                ("高职专科", "vocational_college"),
                ("高职本科", "vocational_university"),
                ("普通本科", "undergraduate"),
                ("硕士研究生", "master_degree"),
            ])),
        )
        .with_placeholder("请选择最高学历")
        .required("请选择最高学历"),
        FieldDescriptor::new("educationMajor", "最高学历所学专业", FieldKind::text())
            .required("请输入最高学历所学专业"),
    ]
}

// ============================================================================
// Step 3 - employment
// ============================================================================

/// 第三部分：从业信息
pub fn employment_fields() -> Vec<FieldDescriptor> {
    let positions = Role::selectable()
        .iter()
        .map(|role| ChoiceOption::new(role.label(), role.as_str()))
        .collect();

    vec![
        FieldDescriptor::new("currentPosition", "当前岗位", FieldKind::dropdown(positions))
            .required("请选择当前岗位"),
        FieldDescriptor::new(
            "interval",
            "从业以来更换托育机构的时间间隔",
            FieldKind::dropdown(options(&[
                ("1年以内", "1"),
                ("1-3年", "1-3"),
                ("3-5年", "3-5"),
                ("5年以上", "5+"),
                ("从未更换", "never"),
            ])),
        )
        .with_placeholder("请选择从业以来更换托育机构的时间间隔")
        .required("请选择从业以来更换托育机构的时间间隔"),
        FieldDescriptor::new(
            "reason",
            "从业以来更换托育机构的原因",
            FieldKind::MultiChoice {
                options: options(&[
                    ("个人原因", "personal"),
                    ("家庭原因", "family"),
                    ("机构原因", "institution"),
                    ("其他", "other"),
                ]),
            },
        )
        .with_placeholder("请选择从业以来更换托育机构的原因")
        .required("请选择从业以来更换托育机构的原因"),
        FieldDescriptor::new(
            "salaryRange",
            "当前薪资范围",
            FieldKind::dropdown(options(&[
                ("1000-3000元", "1000-2000"),
                ("3000-5000元", "3000-5000"),
                ("5000-8000元", "5000-8000"),
                ("8000-10000元", "8000-10000"),
                ("10000元以上", "10000+"),
            ])),
        )
        .with_placeholder("请选择当前薪资范围"),
        FieldDescriptor::new(
            "isFromTeacherToTeacher",
            "是否从幼儿园班级教师转型成为托班教师",
            FieldKind::radio(yes_no()),
        )
        .required("请选择是否从幼儿园班级教师转型成为托班教师"),
        FieldDescriptor::new(
            "reasonFromTeacherToTeacher",
            "从幼儿园班级教师转型成为托班教师的原因",
            FieldKind::FreeText,
        )
        .required("请输入从幼儿园班级教师转型成为托班教师的原因"),
    ]
}

// ============================================================================
// Step 4 - role specific
// ============================================================================

/// Shared by every role
pub fn responsibilities_field() -> FieldDescriptor {
    FieldDescriptor::new("responsibilities", "工作主要职责", FieldKind::FreeText)
        .required("请填写主要职责")
}

/// Directors: core daily tasks
pub fn core_tasks_field() -> FieldDescriptor {
    FieldDescriptor::new(
        "coreTasks",
        "您日常工作最核心的任务是",
        FieldKind::CheckboxGroup {
            options: options(&[
                ("年度工作计划制定与定期报告", "annual_plan"),
                (
                    "托育机构场地、建筑设计、室内外环境、设施设备、图书与游戏材料等规范的设置",
                    "setting_up_the_institution",
                ),
                (
                    "信息管理、健康管理、膳食管理、疾病防控、安全防护、人员管理、人员培训、财务管理、家长与社区联系等制度的建立与实施",
                    "Implementation",
                ),
                ("教职工团队建设、培训与绩效管理", "team_building_and_training"),
                ("一日生活安排与指导", "daily_life_arrangement_and_guidance"),
                (
                    "动作、语言、认知、情感与社会性等保育活动组织与指导",
                    "physical_language_cognitive_emotional_and_social_development_guidance",
                ),
                ("环境创设", "environment_creation"),
                ("照护服务日常记录和反馈", "daily_record_and_feedback"),
                ("保育人员工作的检查和评估", "inspection_and_evaluation_of_caregivers"),
                ("招生运营、品牌建设", "marketing_and_brand_building"),
                (
                    "对外合作与资源整合",
                    "external_collaboration_and_resource_integration",
                ),
            ]),
        },
    )
    .with_span(2)
}

/// Teachers: most needed professional training
pub fn training_needs_field() -> FieldDescriptor {
    FieldDescriptor::new(
        "trainingNeeds",
        "最需要的专业技能培训",
        FieldKind::radio(options(&[
            ("课程设计", "curriculum"),
            ("家园沟通", "communication"),
            ("儿童心理", "psychology"),
        ])),
    )
    .with_span(2)
}

/// Teachers: importance of each competency statement
pub fn competency_matrix_field() -> FieldDescriptor {
    let columns = [
        ("非常不重要", 1),
        ("不重要", 2),
        ("一般", 3),
        ("重要", 4),
        ("非常重要", 5),
    ]
    .into_iter()
    .map(|(label, value)| MatrixColumn {
        label: label.to_string(),
        value,
    })
    .collect();

    let statements = [
        "热爱本职，以德立身",
        "负责奉献，主动承担，乐于分享",
        "尊重婴幼儿个体差异、平等对待每一位幼儿的理念",
        "严格遵守教师职业道德规范",
        "善于自我情绪调节，保持平和心态与稳定情绪",
        "言谈举止文明得体，仪表端庄大方",
        "善于沟通协作，尊重他人、互相理解",
        "自觉遵守幼儿园各项规章制度，坚守工作岗位、履职尽责",
        "以热爱、尊重、平等的态度对待每一名幼儿",
        "主动了解并满足幼儿身心发展的个性化需求，关注每名幼儿的成长进程",
        "坚持正面教育与引导原则",
        "遵守教育法律法规，严格执行机构保育与教育目标",
        "灵活运用适宜的方法、手段与途径开展工作",
        "持续学习、追求专业成长的进取意识",
    ];
    let rows = statements
        .iter()
        .enumerate()
        .map(|(i, label)| ChoiceOption::new(*label, format!("item{}", i + 1)))
        .collect();

    FieldDescriptor::new(
        "competency_matrix",
        "请选择下列各项素质素养的重要程度",
        FieldKind::RatingMatrix(MatrixLayout {
            row_title: "素质素养".to_string(),
            columns,
            rows,
        }),
    )
    .with_span(2)
}

/// Caregivers: most needed care training
pub fn care_skills_field() -> FieldDescriptor {
    FieldDescriptor::new(
        "careSkills",
        "最需要的保育技能培训",
        FieldKind::radio(options(&[
            ("卫生消毒", "hygiene"),
            ("意外伤害处理", "accident"),
            ("营养喂养", "nutrition"),
        ])),
    )
    .with_span(2)
}

// ============================================================================
// Step 5 - director only
// ============================================================================

/// 第五部分：园长/负责人专属
pub fn director_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("totalStaff", "机构总人数", FieldKind::text())
            .required("请输入总人数"),
        FieldDescriptor::new(
            "futureTalentNeeds",
            "未来三年人才需求",
            FieldKind::CheckboxGroup {
                options: options(&[
                    ("专业教师", "teacher"),
                    ("保育员", "caregiver"),
                    ("保健医", "doctor"),
                    ("管理人员", "manager"),
                ]),
            },
        )
        .with_span(2),
        FieldDescriptor::new("suggestions", "对人才培养的建议", FieldKind::FreeText)
            .with_span(2),
    ]
}
