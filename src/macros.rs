//! 宏集合：用字面量列表直接构造列选择器与 AND 组，无需逐个调用 builder 方法。

/// 构造 `ColumnSelector`：`columns!["t1.a", "t1.b" => "label"]`。
#[macro_export]
macro_rules! columns {
    () => {
        $crate::ColumnSelector::new()
    };
    ($($column:expr $(=> $label:expr)?),+ $(,)?) => {{
        let mut sel = $crate::ColumnSelector::new();
        $(
            $crate::__push_column!(sel, $column $(, $label)?);
        )+
        sel
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __push_column {
    ($sel:ident, $column:expr) => {
        $sel.push($column, None::<String>)
    };
    ($sel:ident, $column:expr, $label:expr) => {
        $sel.push($column, Some($label))
    };
}

/// 构造 `AndSet`：`and_set!{"col1" => "a", "col2" => 5_i64}`。
#[macro_export]
macro_rules! and_set {
    () => {
        $crate::AndSet::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut set = $crate::AndSet::new();
        $(
            set.push($column, $value);
        )+
        set
    }};
}
