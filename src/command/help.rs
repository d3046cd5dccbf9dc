//! .help 文本

pub const HELP_TITLE: &str = "内置命令帮助:";

pub const HELP_LINES: &[&str] = &[
    "  .help          - 显示此帮助信息",
    "  .where         - 显示机器人当前坐标",
    "  .time          - 显示服务器时间刻",
    "  .find          - 显示可见范围内的玩家坐标",
    "  .find_block <方块名> - 查找指定方块",
    "  .go <x> <y> <z> - 向指定坐标移动（使用寻路）",
    "  .go stop       - 停止当前寻路任务",
    "  .hunt <玩家名> - 自动跟随指定玩家",
    "  .hunt stop     - 停止跟随玩家",
    "  .hand info     - 查看所有物品栏信息",
    "  .hand <0-9>    - 切换到指定物品栏槽位",
    "  .hand use <A/B> - 执行动作（A=左键，B=右键）",
    "  .info          - 显示bot状态信息",
    "  .open <方块名> <A/B> - 寻找并操作指定方块",
    "  .chest         - 查看当前打开的箱子内容",
    "  .inv           - 查看完整背包内容",
    "  .exit          - 断开连接并退出程序",
];

pub const HELP_TIP: &str = "提示: 直接输入文本发送到聊天，输入/命令执行MC命令";
